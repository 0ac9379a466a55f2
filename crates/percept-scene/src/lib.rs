//! Percept Scene - Object model and frame synchronization
//!
//! This crate holds the scene items of the perception front end:
//! - `ObjectModel` - Tree of containers, point clouds, frames and affordances
//! - `FrameItem` - A coordinate frame that notifies listeners when it moves
//! - `FrameSync` - Keeps a group of frames rigidly locked together
//! - `AffordanceItem` - Parametric objects published to an affordance server
//! - `show_*` / `update_*` helpers and the layered `VizConfig`

mod affordance;
mod callbacks;
mod config;
mod frame;
mod frame_sync;
mod item;
mod object;
mod object_model;
mod poly_data;
mod show;
mod view;

pub use affordance::{
    AffordanceDescription, AffordanceItem, AffordanceKind, AffordanceParams,
    AffordancePublisher, ServerAffordance, PUBLISH_ACTION, SERVER_UPDATES_PROPERTY, UID_PROPERTY,
};
pub use callbacks::{CallbackRegistry, SubscriptionId};
pub use config::{DisplayConfig, FrameConfig, VizConfig};
pub use frame::{FrameItem, FrameWidget, EDIT_PROPERTY, SCALE_PROPERTY};
pub use frame_sync::FrameSync;
pub use item::{ContainerItem, SceneItem, NAME_PROPERTY, VISIBLE_PROPERTY};
pub use object::SceneObject;
pub use object_model::ObjectModel;
pub use poly_data::{
    ActorProperties, DataArray, LookupTable, PolyData, PolyDataItem, ALPHA_PROPERTY,
    COLOR_PROPERTY, POINT_SIZE_PROPERTY,
};
pub use show::{
    resolve_parent, show_affordance, show_cluster_objects, show_frame, show_poly_data,
    update_frame, update_poly_data, Cluster, FrameOptions, ParentRef, ShowOptions,
};
pub use view::{HeadlessView, RenderView, ViewHandle};
