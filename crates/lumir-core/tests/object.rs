#![allow(unused_imports)]

use lumir_core::{
    codegen::ObjectCompiler, CodegenConfig, CompileError, Expr, LoopVar, Pipeline, Stmt,
    ValType,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn x() -> Expr {
    Expr::var("x", ValType::Int(32))
}

fn blur() -> Pipeline {
    // out[x] = (in[x] + in[x + 1]) / 2
    let left = Expr::load(ValType::UInt(16), 2, x());
    let right = Expr::load(ValType::UInt(16), 2, Expr::add(x(), Expr::IntImm(1)));
    let value = Expr::div(Expr::add(left, right), Expr::IntImm(2));
    let body = Stmt::for_loop(
        LoopVar::new("x", Expr::IntImm(0), Expr::IntImm(64)),
        Stmt::store(value, 0, x()),
    );
    Pipeline::new("blur", body)
}

#[test]
fn test_write_object_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blur.o");

    let mut compiler = ObjectCompiler::new(CodegenConfig::default()).unwrap();
    let entry = compiler.assemble_pipeline(&blur()).unwrap();
    assert_eq!(entry.param_names, vec!["buf1", "buf2"]);
    assert_eq!(entry.param_for(lumir_core::BufferId(2)), Some(1));

    let written = compiler.write_object(&path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), written);
    assert!(written > 0);
    #[cfg(target_os = "linux")]
    assert_eq!(&bytes[..4], b"\x7fELF");
}

#[test]
fn test_unwritable_path_reports_artifact_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("blur.o");

    let mut compiler = ObjectCompiler::new(CodegenConfig::default()).unwrap();
    compiler.assemble_pipeline(&blur()).unwrap();
    match compiler.write_object(&path) {
        Err(CompileError::ArtifactWriteFailed { path: reported, .. }) => {
            assert_eq!(reported, path)
        }
        other => panic!("expected ArtifactWriteFailed, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_ir_is_deterministic() {
    let mut first = ObjectCompiler::new(CodegenConfig::default()).unwrap();
    let mut second = ObjectCompiler::new(CodegenConfig::default()).unwrap();
    let a = first.assemble_pipeline(&blur()).unwrap();
    let b = second.assemble_pipeline(&blur()).unwrap();
    assert_eq!(a.ir, b.ir);
}

#[test]
fn test_unsigned_pipeline_uses_unsigned_division() {
    let mut compiler = ObjectCompiler::new(CodegenConfig::default()).unwrap();
    let entry = compiler.assemble_pipeline(&blur()).unwrap();
    assert!(entry.ir.contains("udiv"));
    assert!(entry.ir.contains("icmp slt"));
    assert!(!entry.ir.contains("sdiv"));
}

#[test]
fn test_unimplemented_statement_leaves_no_function() {
    let cond = Expr::cmp(lumir_core::CmpOp::LT, x(), Expr::IntImm(3));
    let body = Stmt::for_loop(
        LoopVar::new("x", Expr::IntImm(0), Expr::IntImm(8)),
        Stmt::IfElse {
            cond,
            then: Box::new(Stmt::store(Expr::IntImm(1), 0, x())),
            otherwise: Box::new(Stmt::store(Expr::IntImm(0), 0, x())),
        },
    );

    let mut compiler = ObjectCompiler::new(CodegenConfig::default()).unwrap();
    let err = compiler.assemble("blur", &body).unwrap_err();
    assert!(matches!(err, CompileError::UnimplementedInstruction(_)));

    // The failed attempt declared nothing, so the name is still free.
    let entry = compiler.assemble_pipeline(&blur()).unwrap();
    assert_eq!(entry.name, "blur");
}

#[test]
fn test_mismatched_operands_fail_verification() {
    let value = Expr::add(
        Expr::load(ValType::Int(32), 0, Expr::IntImm(0)),
        Expr::load(ValType::Int(16), 1, Expr::IntImm(0)),
    );
    let body = Stmt::store(value, 0, Expr::IntImm(0));

    let mut compiler = ObjectCompiler::new(CodegenConfig::default()).unwrap();
    let err = compiler.assemble("mixed", &body).unwrap_err();
    assert!(matches!(err, CompileError::CodegenFailed(_)));
}

#[test]
fn test_host_wrapper_in_object() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blur_host.o");
    let config = CodegenConfig {
        host_data_offset: 16,
        ..CodegenConfig::default()
    };

    let mut compiler = ObjectCompiler::new(config).unwrap();
    let entry = compiler.assemble_pipeline(&blur()).unwrap();
    let host = compiler.wrap(&entry).unwrap();
    assert_eq!(host.name, "blur_host");
    assert_eq!(host.param_names, vec!["buf1_obj", "buf2_obj"]);
    assert!(host.ir.contains("+16"));

    assert!(compiler.write_object(&path).unwrap() > 0);
}

#[test]
fn test_explicit_triple() {
    let config = CodegenConfig {
        target: lumir_core::Target::Triple("x86_64-unknown-linux-gnu".to_string()),
        ..CodegenConfig::default()
    };
    let mut compiler = ObjectCompiler::new(config).unwrap();
    compiler.assemble_pipeline(&blur()).unwrap();
    let bytes = compiler.finish().unwrap();
    assert_eq!(&bytes[..4], b"\x7fELF");
}
