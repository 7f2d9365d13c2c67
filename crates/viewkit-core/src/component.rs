use crate::ctx::{MountCtx, RenderCtx};
use crate::error::ViewResult;

/// Lifecycle contract of anything living in the display tree.
///
/// The tree calls `on_mount` once after insertion and `on_unmount` at most
/// once before removal.
pub trait Component {
    fn id(&self) -> &'static str;

    fn on_mount(&mut self, _ctx: &mut MountCtx<'_>) {}

    fn render(&mut self, _ctx: &RenderCtx) -> ViewResult<()> {
        Ok(())
    }

    fn on_unmount(&mut self) {}
}
