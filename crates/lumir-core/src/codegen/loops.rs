use tracing::debug;

use crate::{
    codegen::{
        emitter::{BinaryInst, InstEmitter, IntCond},
        lowering::Lowering,
        machine::machine_type,
    },
    expr::operand_type,
    stmt::{LoopVar, Stmt},
    CompileError, Result,
};

impl<'e, E: InstEmitter> Lowering<'e, E> {
    /// Lower a counted loop over `[var.min, var.max)`.
    ///
    /// ```text
    /// preheader:  min, max computed; jump header(min)
    /// header(i):  body with `var.name` bound to i
    ///             next = i + 1
    ///             brif next < max, header(next), exit
    /// exit:
    /// ```
    ///
    /// The test sits at the bottom, so the body runs once even when `min >= max`. The induction
    /// variable takes the bounds' shared operand type, as binary operands do.
    pub fn compile_for(&mut self, var: &LoopVar, body: &Stmt) -> Result<()> {
        let ty = operand_type(&var.min, &var.max);
        if ty.is_vector() || ty.is_float() {
            return Err(CompileError::UnimplementedInstruction(format!(
                "loop variable {} of type {}",
                var.name, ty
            )));
        }
        let mt = machine_type(&ty)?;
        debug!(var = %var.name, min = %var.min, max = %var.max, "lowering loop");

        let min = self.compile_operand(&var.min, &ty)?;
        let max = self.compile_operand(&var.max, &ty)?;

        let header = self.emitter.create_block();
        let exit = self.emitter.create_block();
        let induction = self.emitter.append_block_param(header, mt)?;

        self.emitter.jump(header, &[min]);
        self.emitter.switch_to_block(header);

        self.symbols.bind(&var.name, induction);
        let lowered = self.compile_stmt(body);
        self.symbols.unbind(&var.name);
        lowered?;

        let one = self.emitter.iconst(mt, 1)?;
        let next = self.emitter.binary(BinaryInst::Iadd, induction, one);
        let again = self.emitter.icmp(IntCond::SignedLessThan, next, max);
        self.emitter.brif(again, header, &[next], exit, &[]);
        self.emitter.seal_block(header);

        self.emitter.switch_to_block(exit);
        self.emitter.seal_block(exit);
        Ok(())
    }
}
