use pretty_assertions::assert_eq;

use super::recording::{Rec, RecordingEmitter};
use crate::codegen::lowering::Lowering;
use crate::expr::{CmpOp, Expr, MemRef};
use crate::stmt::{LoopVar, ReduceOp, Stmt};
use crate::types::ValType;
use crate::CompileError;

fn x() -> Expr {
    Expr::var("x", ValType::Int(32))
}

fn lower(stmt: &Stmt) -> (Vec<Rec>, crate::Result<()>) {
    let mut em = RecordingEmitter::new();
    let frame = em.frame(&[0, 1]);
    let result = {
        let mut lowering = Lowering::with_frame(&mut em, frame);
        lowering.compile_stmt(stmt)
    };
    (em.log, result)
}

fn doubling_loop(map: bool) -> Stmt {
    let var = LoopVar::new("x", Expr::IntImm(0), Expr::IntImm(10));
    let value = Expr::mul(Expr::load(ValType::UInt(16), 0, x()), Expr::IntImm(2));
    let body = Stmt::store(value, 0, x());
    if map {
        Stmt::map_loop(var, body)
    } else {
        Stmt::for_loop(var, body)
    }
}

#[test]
fn test_store_value_type_sets_width() {
    let stmt = Stmt::store(
        Expr::cast(ValType::UInt(8), Expr::IntImm(300)),
        1,
        Expr::IntImm(2),
    );
    let (log, result) = lower(&stmt);
    result.unwrap();
    // Byte stores use a stride of one.
    assert!(log.iter().any(|r| matches!(
        r,
        Rec::Iconst {
            imm: 1,
            ty: crate::codegen::machine::MachineType::I64,
            ..
        }
    )));
    assert_eq!(log.iter().filter(|r| matches!(r, Rec::Store { .. })).count(), 1);
}

#[test]
fn test_block_lowers_in_order() {
    let stmt = Stmt::Block(vec![
        Stmt::store(Expr::IntImm(1), 0, Expr::IntImm(0)),
        Stmt::store(Expr::IntImm(2), 1, Expr::IntImm(0)),
    ]);
    let (log, result) = lower(&stmt);
    result.unwrap();
    let addrs: Vec<u32> = log
        .iter()
        .filter_map(|r| match r {
            Rec::Store { addr, .. } => Some(*addr),
            _ => None,
        })
        .collect();
    assert_eq!(addrs.len(), 2);
    assert!(addrs[0] < addrs[1]);
}

#[test]
fn test_empty_block_rejected() {
    let (_, result) = lower(&Stmt::Block(vec![]));
    assert!(matches!(result, Err(CompileError::InvalidIr(_))));
}

#[test]
fn test_conditionals_and_reductions_unimplemented() {
    let cond = Expr::cmp(CmpOp::LT, Expr::IntImm(0), Expr::IntImm(1));
    let store = Stmt::store(Expr::IntImm(0), 0, Expr::IntImm(0));
    let stmts = [
        Stmt::If {
            cond: cond.clone(),
            body: Box::new(store.clone()),
        },
        Stmt::IfElse {
            cond,
            then: Box::new(store.clone()),
            otherwise: Box::new(store),
        },
        Stmt::Reduce {
            op: ReduceOp::Add,
            value: Expr::IntImm(1),
            target: MemRef::new(0, Expr::IntImm(0)),
        },
    ];
    for stmt in &stmts {
        let (log, result) = lower(stmt);
        match result {
            Err(CompileError::UnimplementedInstruction(msg)) => assert!(msg.contains(stmt.kind())),
            other => panic!("expected UnimplementedInstruction, got {:?}", other),
        }
    }
}

#[test]
fn test_map_lowers_like_for() {
    let (map_log, map_result) = lower(&doubling_loop(true));
    let (for_log, for_result) = lower(&doubling_loop(false));
    map_result.unwrap();
    for_result.unwrap();
    assert_eq!(map_log, for_log);
}

#[test]
fn test_lowering_is_deterministic() {
    let (first, _) = lower(&doubling_loop(false));
    let (second, _) = lower(&doubling_loop(false));
    assert_eq!(first, second);
}

#[test]
fn test_store_of_vector_compare_unimplemented() {
    let u16x8 = ValType::vector(ValType::UInt(16), 8);
    let mask = Expr::cmp(CmpOp::LT, Expr::load(u16x8, 0, x()), Expr::IntImm(5));
    let stmt = Stmt::for_loop(
        LoopVar::new("x", Expr::IntImm(0), Expr::IntImm(2)),
        Stmt::store(mask, 1, x()),
    );
    let (log, result) = lower(&stmt);
    match result {
        Err(CompileError::UnimplementedInstruction(what)) => {
            assert_eq!(what, "store of uint1x8 lane mask")
        }
        other => panic!("expected UnimplementedInstruction, got {:?}", other),
    }
    assert!(!log.iter().any(|r| matches!(r, Rec::Store { .. })));
}
