/// FIFO buffer of pending commands.
///
/// Reserve once at startup to avoid allocating during a pass.
pub struct CommandQueue<T> {
    buf: Vec<T>,
}

impl<T> CommandQueue<T> {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
        }
    }

    #[inline]
    pub fn push(&mut self, cmd: T) {
        self.buf.push(cmd);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Take everything queued so far, oldest first.
    #[inline]
    pub fn take_all(&mut self) -> Vec<T> {
        std::mem::take(&mut self.buf)
    }
}

impl<T> Default for CommandQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
