//! Affordances: parametric stand-ins for objects the robot can manipulate
//!
//! An affordance is a renderable item plus a parameter record. Its pose is
//! the actor's user transform, which is either owned by the item or read
//! live from an attached [`FrameItem`]. Publishing hands a description of
//! the affordance to an external channel.

use crate::frame::FrameItem;
use crate::poly_data::{PolyData, PolyDataItem};
use crate::view::ViewHandle;
use glam::DVec3;
use percept_core::{compute_a_to_b, ItemId, PerceptError, Result, Transform};
use percept_props::{PropertyAttributes, PropertyValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

pub const UID_PROPERTY: &str = "uid";
pub const SERVER_UPDATES_PROPERTY: &str = "Server updates enabled";
pub const PUBLISH_ACTION: &str = "Publish affordance";

const MAX_UID: f64 = 1e6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AffordanceKind {
    Block,
    Frame,
    Cylinder,
}

impl AffordanceKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            AffordanceKind::Block => "block",
            AffordanceKind::Frame => "frame",
            AffordanceKind::Cylinder => "cylinder",
        }
    }
}

/// Parameter record shared with the affordance server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AffordanceParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<u64>,
    /// Object template name; required by frame affordances
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otdf_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<DVec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<DVec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<DVec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zaxis: Option<DVec3>,
    /// Symmetry axis of a cylinder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis: Option<DVec3>,
    /// Shape dimensions such as `xwidth` or `radius`
    #[serde(default)]
    pub dimensions: BTreeMap<String, f64>,
}

/// What gets handed to the publish channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffordanceDescription {
    pub kind: AffordanceKind,
    pub name: String,
    pub params: AffordanceParams,
}

/// External channel that affordances are published to
pub trait AffordancePublisher {
    fn publish_affordance(&self, description: &AffordanceDescription) -> Result<()>;
}

/// Pose update for an affordance, as reported by the affordance server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerAffordance {
    pub uid: u64,
    pub origin_xyz: DVec3,
    /// Roll, pitch, yaw in radians
    pub origin_rpy: DVec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct IcpTracking {
    initial: Transform,
    base: Transform,
}

pub struct AffordanceItem {
    poly: PolyDataItem,
    kind: AffordanceKind,
    params: AffordanceParams,
    user_transform: Transform,
    frame: Option<Weak<FrameItem>>,
    publisher: Option<Rc<dyn AffordancePublisher>>,
    publish_callback: Option<Box<dyn FnMut()>>,
    icp: Option<IcpTracking>,
}

impl AffordanceItem {
    pub fn new(name: impl Into<String>, kind: AffordanceKind, poly_data: PolyData) -> Result<Self> {
        let mut poly = PolyDataItem::new(name, poly_data)?;
        poly.add_property(
            UID_PROPERTY,
            0,
            PropertyAttributes::range(0.0, MAX_UID)
                .with_decimals(0)
                .with_single_step(1.0),
        )?;
        poly.add_property(SERVER_UPDATES_PROPERTY, false, PropertyAttributes::default())?;

        Ok(Self {
            poly,
            kind,
            params: AffordanceParams::default(),
            user_transform: Transform::IDENTITY,
            frame: None,
            publisher: None,
            publish_callback: None,
            icp: None,
        })
    }

    pub fn id(&self) -> ItemId {
        self.poly.id()
    }

    pub fn name(&self) -> &str {
        self.poly.name()
    }

    pub fn kind(&self) -> AffordanceKind {
        self.kind
    }

    pub fn poly(&self) -> &PolyDataItem {
        &self.poly
    }

    pub fn poly_mut(&mut self) -> &mut PolyDataItem {
        &mut self.poly
    }

    pub fn params(&self) -> &AffordanceParams {
        &self.params
    }

    pub fn uid(&self) -> Option<u64> {
        self.params.uid.filter(|uid| *uid != 0)
    }

    pub fn set_affordance_params(&mut self, params: AffordanceParams) -> Result<()> {
        if self.kind == AffordanceKind::Frame && params.otdf_type.is_none() {
            return Err(PerceptError::MissingAffordanceParam("otdf_type".to_string()));
        }
        self.params = params;
        Ok(())
    }

    /// Read the pose from `frame` from now on. Falls back to the owned
    /// transform once the frame is dropped.
    pub fn attach_frame(&mut self, frame: &Rc<FrameItem>) {
        self.frame = Some(Rc::downgrade(frame));
    }

    pub fn detach_frame(&mut self) {
        if let Some(frame) = self.attached_frame() {
            self.user_transform = frame.transform();
        }
        self.frame = None;
    }

    pub fn attached_frame(&self) -> Option<Rc<FrameItem>> {
        self.frame.as_ref().and_then(Weak::upgrade)
    }

    pub fn user_transform(&self) -> Transform {
        self.attached_frame()
            .map(|frame| frame.transform())
            .unwrap_or(self.user_transform)
    }

    /// Move the affordance. With an attached frame the frame is moved, so
    /// frame listeners (and any sync group) see the change.
    pub fn set_user_transform(&mut self, transform: Transform) {
        match self.attached_frame() {
            Some(frame) => frame.set_transform(transform),
            None => self.user_transform = transform,
        }

        if self.poly.is_visible() {
            self.poly.render_all_views();
        }
    }

    pub fn update_params_from_actor_transform(&mut self) {
        let t = self.user_transform();
        self.params.origin = Some(t.position());
        match self.kind {
            AffordanceKind::Block | AffordanceKind::Frame => {
                self.params.xaxis = Some(t.x_axis());
                self.params.yaxis = Some(t.y_axis());
                self.params.zaxis = Some(t.z_axis());
            }
            AffordanceKind::Cylinder => {
                self.params.axis = Some(t.z_axis());
            }
        }
    }

    pub fn description(&self) -> AffordanceDescription {
        AffordanceDescription {
            kind: self.kind,
            name: self.name().to_string(),
            params: self.params.clone(),
        }
    }

    pub fn set_publisher(&mut self, publisher: Rc<dyn AffordancePublisher>) {
        self.publisher = Some(publisher);
    }

    /// Called after each successful publish of a block affordance
    pub fn set_publish_callback(&mut self, callback: impl FnMut() + 'static) {
        self.publish_callback = Some(Box::new(callback));
    }

    pub fn publish(&mut self) -> Result<()> {
        self.update_params_from_actor_transform();

        let publisher = self.publisher.as_ref().ok_or_else(|| {
            PerceptError::PublishError(format!("no publisher for affordance '{}'", self.name()))
        })?;
        publisher.publish_affordance(&self.description())?;

        if self.kind == AffordanceKind::Block {
            if let Some(callback) = self.publish_callback.as_mut() {
                callback();
            }
        }
        Ok(())
    }

    pub fn action_names(&self) -> Vec<&'static str> {
        vec![PUBLISH_ACTION]
    }

    pub fn on_action(&mut self, action: &str) -> Result<()> {
        match action {
            PUBLISH_ACTION => self.publish(),
            _ => Err(PerceptError::UnknownAction(action.to_string())),
        }
    }

    /// Adopt the server's uid if none is set yet, then follow the server pose
    /// when server updates are enabled
    pub fn on_server_affordance_update(&mut self, update: &ServerAffordance) -> Result<()> {
        if self.uid().is_none() {
            let uid = i64::try_from(update.uid).map_err(|_| PerceptError::ValueOutOfRange {
                property: UID_PROPERTY.to_string(),
                min: 0.0,
                max: MAX_UID,
                value: update.uid as f64,
            })?;
            self.set_property(UID_PROPERTY, uid)?;
            self.params.uid = Some(update.uid);
        }

        let follow = self
            .poly
            .item()
            .properties()
            .get_bool(SERVER_UPDATES_PROPERTY)
            .unwrap_or(false);
        if follow {
            self.set_user_transform(Transform::from_xyz_rpy(update.origin_xyz, update.origin_rpy));
        }
        Ok(())
    }

    /// Start tracking an ICP fit. `initial` is the fit result that matches
    /// the current pose. Only blocks are tracked.
    pub fn begin_icp_tracking(&mut self, initial: Transform) -> bool {
        if self.kind != AffordanceKind::Block {
            log::warn!(
                "affordance '{}': ICP tracking is not supported for {}",
                self.name(),
                self.kind.type_name()
            );
            return false;
        }
        self.icp = Some(IcpTracking {
            initial,
            base: self.user_transform(),
        });
        true
    }

    /// Move by the inverse of how far the ICP fit has drifted from its initial result
    pub fn update_icp_transform(&mut self, latest: &Transform) -> bool {
        let Some(icp) = self.icp else {
            log::warn!("affordance '{}': ICP update without tracking", self.name());
            return false;
        };

        let delta = compute_a_to_b(&icp.initial, latest);
        log::debug!(
            "affordance '{}': ICP delta {:?} rpy {:?}",
            self.name(),
            delta.position(),
            delta.orientation_rpy()
        );
        self.set_user_transform(icp.base.then(&delta.inverse()));
        true
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.poly.property(name)
    }

    pub fn set_property(&mut self, name: &str, value: impl Into<PropertyValue>) -> Result<()> {
        self.poly.set_property(name, value)
    }

    pub fn views(&self) -> &[ViewHandle] {
        self.poly.views()
    }

    pub fn add_to_view(&mut self, view: &ViewHandle) {
        self.poly.add_to_view(view);
    }

    pub fn remove_from_view(&mut self, view: &ViewHandle) -> Result<()> {
        self.poly.remove_from_view(view)
    }

    pub fn on_remove_from_object_model(&mut self) {
        self.poly.on_remove_from_object_model();
    }
}

impl fmt::Debug for AffordanceItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AffordanceItem")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("kind", &self.kind)
            .field("params", &self.params)
            .finish()
    }
}
