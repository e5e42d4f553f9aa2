use inkwell::basic_block::BasicBlock;
use tracing::trace;

/// Jump targets of one enclosing loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopContext<'ctx> {
    /// Condition test for `while`, step block for `for`.
    pub continue_block: BasicBlock<'ctx>,
    pub break_block: BasicBlock<'ctx>,
}

/// Loop nesting, kept apart from the lexical scopes so loop targets never
/// become visible as names.
#[derive(Debug, Default)]
pub struct LoopStack<'ctx> {
    loops: Vec<LoopContext<'ctx>>,
}

impl<'ctx> LoopStack<'ctx> {
    pub fn push(&mut self, context: LoopContext<'ctx>) {
        self.loops.push(context);
        trace!(depth = self.loops.len(), "enter loop");
    }

    pub fn pop(&mut self) -> Option<LoopContext<'ctx>> {
        let context = self.loops.pop();
        trace!(depth = self.loops.len(), "leave loop");
        context
    }

    /// Innermost enclosing loop.
    pub fn current(&self) -> Option<&LoopContext<'ctx>> {
        self.loops.last()
    }

    pub fn depth(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }
}
