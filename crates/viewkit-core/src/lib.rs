pub mod commands;
pub mod component;
pub mod config;
pub mod ctx;
pub mod error;
pub mod events;
pub mod resize;
pub mod schedule;
pub mod tree;

pub use crate::component::Component;
pub use crate::config::{ComponentConfig, ViewConfig};
pub use crate::ctx::{MountCtx, RenderCtx, ViewServices};
pub use crate::error::{ViewError, ViewResult};
pub use crate::events::{
    ListenerHandle, ListenerStats, ResizeEvents, ResizeReaction, ViewportSize, WindowResizeSource,
};
pub use crate::resize::{
    bind_reaction, Reactive, ReactiveBuilder, ResizeAware, ResizeAwareComponent, ResizeCapability,
    ResizeState,
};
pub use crate::schedule::{AfterRenderQueue, DeferredScheduler, DeferredTask};
pub use crate::tree::{DisplayTree, NodeId};
