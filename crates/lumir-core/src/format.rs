use crate::{
    analysis::buffers_in_stmt,
    expr::{ArithOp, CmpOp, Expr, LogicOp, MemRef},
    pipeline::Pipeline,
    stmt::{ReduceOp, Stmt},
};
use std::fmt::{self, Write};

pub fn format_pipeline(pipeline: &Pipeline) -> String {
    let mut output = String::new();
    let buffers = buffers_in_stmt(&pipeline.body)
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let _ = writeln!(&mut output, "; Pipeline: {}", pipeline.name);
    let _ = writeln!(&mut output, "; Buffers: [{}]", buffers);
    let _ = write_stmt(&mut output, &pipeline.body, 0);
    output
}

pub fn format_stmt(stmt: &Stmt) -> String {
    let mut output = String::new();
    let _ = write_stmt(&mut output, stmt, 0);
    output
}

fn write_stmt(out: &mut String, stmt: &Stmt, depth: usize) -> fmt::Result {
    let pad = "    ".repeat(depth);
    match stmt {
        Stmt::Store { value, target } => writeln!(out, "{}{} = {}", pad, target, value),
        Stmt::Reduce { op, value, target } => {
            writeln!(out, "{}{} {}= {}", pad, target, reduce_symbol(*op), value)
        }
        Stmt::Map { var, body } | Stmt::For { var, body } => {
            let keyword = if matches!(stmt, Stmt::Map { .. }) {
                "map"
            } else {
                "for"
            };
            writeln!(
                out,
                "{}{} {} in [{}, {}) {{",
                pad, keyword, var.name, var.min, var.max
            )?;
            write_stmt(out, body, depth + 1)?;
            writeln!(out, "{}}}", pad)
        }
        Stmt::Block(stmts) => {
            for s in stmts {
                write_stmt(out, s, depth)?;
            }
            Ok(())
        }
        Stmt::If { cond, body } => {
            writeln!(out, "{}if {} {{", pad, cond)?;
            write_stmt(out, body, depth + 1)?;
            writeln!(out, "{}}}", pad)
        }
        Stmt::IfElse {
            cond,
            then,
            otherwise,
        } => {
            writeln!(out, "{}if {} {{", pad, cond)?;
            write_stmt(out, then, depth + 1)?;
            writeln!(out, "{}}} else {{", pad)?;
            write_stmt(out, otherwise, depth + 1)?;
            writeln!(out, "{}}}", pad)
        }
    }
}

fn reduce_symbol(op: ReduceOp) -> &'static str {
    match op {
        ReduceOp::Add => "+",
        ReduceOp::Mul => "*",
        ReduceOp::Min => "min",
        ReduceOp::Max => "max",
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        })
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CmpOp::EQ => "==",
            CmpOp::NE => "!=",
            CmpOp::LT => "<",
            CmpOp::LE => "<=",
            CmpOp::GT => ">",
            CmpOp::GE => ">=",
        })
    }
}

impl fmt::Display for LogicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogicOp::And => "&&",
            LogicOp::Or => "||",
        })
    }
}

impl fmt::Display for MemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.buffer, self.index)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::IntImm(v) => write!(f, "{}", v),
            Expr::UIntImm(v) => write!(f, "{}u", v),
            Expr::FloatImm(v) => write!(f, "{:?}f", v),
            Expr::Cast(ty, inner) => write!(f, "{}({})", ty, inner),
            Expr::Arith(op, lhs, rhs) => write!(f, "({} {} {})", lhs, op, rhs),
            Expr::Cmp(op, lhs, rhs) => write!(f, "({} {} {})", lhs, op, rhs),
            Expr::Logic(op, lhs, rhs) => write!(f, "({} {} {})", lhs, op, rhs),
            Expr::Not(inner) => write!(f, "!{}", inner),
            Expr::Select(c, t, e) => write!(f, "select({}, {}, {})", c, t, e),
            Expr::Load(ty, mem) => write!(f, "load.{} {}", ty, mem),
            Expr::Var(_, name) => f.write_str(name),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_stmt(self))
    }
}
