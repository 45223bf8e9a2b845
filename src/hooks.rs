use crate::error::WriteError;

/// Middleware wrapped around the response-body write.
pub trait WriterHook: Send + Sync {
    fn name(&self) -> &str;

    /// Ordinal; lower values are evaluated first and sit outermost.
    fn priority(&self) -> i32;

    /// Runs around the rest of the write. Implementations call
    /// [`WriteContext::proceed`] to continue down the chain.
    fn around_write(&self, ctx: &mut WriteContext<'_>) -> Result<(), WriteError>;
}

/// Continuation handed to each hook: the hooks after it, then the body.
pub struct WriteContext<'a> {
    hooks: &'a [Box<dyn WriterHook>],
    position: usize,
    body: &'a mut dyn FnMut() -> Result<(), WriteError>,
}

impl WriteContext<'_> {
    pub fn proceed(&mut self) -> Result<(), WriteError> {
        let hooks = self.hooks;
        let Some(hook) = hooks.get(self.position) else {
            return (self.body)();
        };

        self.position += 1;
        let result = hook.around_write(self);
        self.position -= 1;
        result
    }

    /// Name of the hook that will run on the next `proceed`, if any.
    pub fn next_hook(&self) -> Option<&str> {
        self.hooks.get(self.position).map(|h| h.name())
    }
}

/// Writer hooks ordered by priority.
#[derive(Default)]
pub struct WriterChain {
    hooks: Vec<Box<dyn WriterHook>>,
}

impl WriterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `hook` after every hook with an equal or lower priority.
    pub fn register(&mut self, hook: impl WriterHook + 'static) -> &mut Self {
        let priority = hook.priority();
        let position = self.hooks.partition_point(|h| h.priority() <= priority);
        tracing::debug!(hook = hook.name(), priority, position, "registered writer hook");
        self.hooks.insert(position, Box::new(hook));
        self
    }

    pub fn hook_names(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Writes through every registered hook, `body` innermost.
    pub fn write<F>(&self, mut body: F) -> Result<(), WriteError>
    where
        F: FnMut() -> Result<(), WriteError>,
    {
        let mut ctx = WriteContext {
            hooks: &self.hooks,
            position: 0,
            body: &mut body,
        };
        ctx.proceed()
    }
}
