//! Helpers that create items, attach them to a view and file them in the
//! object model in one step

use crate::affordance::AffordanceItem;
use crate::config::VizConfig;
use crate::frame::{FrameItem, SCALE_PROPERTY};
use crate::item::VISIBLE_PROPERTY;
use crate::object::SceneObject;
use crate::object_model::ObjectModel;
use crate::poly_data::{PolyData, PolyDataItem, ALPHA_PROPERTY, POINT_SIZE_PROPERTY};
use crate::view::ViewHandle;
use percept_core::{Color, ItemId, PerceptError, Result, Transform};
use std::rc::Rc;

/// Where a new item goes: a container found or created by name, or an
/// existing item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef {
    Name(String),
    Item(ItemId),
}

impl From<&str> for ParentRef {
    fn from(name: &str) -> Self {
        ParentRef::Name(name.to_string())
    }
}

impl From<String> for ParentRef {
    fn from(name: String) -> Self {
        ParentRef::Name(name)
    }
}

impl From<ItemId> for ParentRef {
    fn from(id: ItemId) -> Self {
        ParentRef::Item(id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShowOptions {
    /// Solid color; takes precedence over `color_by`
    pub color: Option<Color>,
    pub color_by: Option<String>,
    pub color_by_range: Option<(f64, f64)>,
    pub alpha: f64,
    pub point_size: f64,
    pub visible: bool,
    pub parent: ParentRef,
}

impl ShowOptions {
    pub fn from_config(config: &VizConfig) -> Self {
        Self {
            color: None,
            color_by: None,
            color_by_range: None,
            alpha: config.display.alpha,
            point_size: config.display.point_size,
            visible: config.display.visible,
            parent: ParentRef::Name(config.display.default_parent.clone()),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_color_by(mut self, array_name: impl Into<String>, range: Option<(f64, f64)>) -> Self {
        self.color_by = Some(array_name.into());
        self.color_by_range = range;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_parent(mut self, parent: impl Into<ParentRef>) -> Self {
        self.parent = parent.into();
        self
    }
}

impl Default for ShowOptions {
    fn default() -> Self {
        Self::from_config(&VizConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameOptions {
    pub parent: ParentRef,
    pub scale: f64,
    pub visible: bool,
}

impl FrameOptions {
    pub fn from_config(config: &VizConfig) -> Self {
        Self {
            parent: ParentRef::Name(config.frames.default_parent.clone()),
            scale: config.frames.scale,
            visible: true,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_parent(mut self, parent: impl Into<ParentRef>) -> Self {
        self.parent = parent.into();
        self
    }
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self::from_config(&VizConfig::default())
    }
}

/// Resolve a parent reference, creating a root container for unknown names
pub fn resolve_parent(om: &mut ObjectModel, parent: &ParentRef) -> Result<ItemId> {
    match parent {
        ParentRef::Name(name) => om.get_or_create_container(name, None),
        ParentRef::Item(id) if om.contains(*id) => Ok(*id),
        ParentRef::Item(id) => Err(PerceptError::ItemNotFound(id.to_string())),
    }
}

fn apply_show_options(item: &mut PolyDataItem, options: &ShowOptions) -> Result<()> {
    item.set_property(VISIBLE_PROPERTY, options.visible)?;
    item.set_property(ALPHA_PROPERTY, options.alpha)?;
    item.set_property(POINT_SIZE_PROPERTY, options.point_size)?;

    match options.color {
        Some(color) => item.set_solid_color(color),
        None => {
            item.color_by(options.color_by.as_deref(), options.color_by_range, None);
            Ok(())
        }
    }
}

fn add_and_attach(
    om: &mut ObjectModel,
    view: &ViewHandle,
    object: SceneObject,
    parent: &ParentRef,
) -> Result<ItemId> {
    let parent = resolve_parent(om, parent)?;
    let id = om.add_to_object_model(object, Some(parent))?;
    if let Some(object) = om.get_mut(id) {
        object.add_to_view(view);
    }
    Ok(id)
}

pub fn show_poly_data(
    om: &mut ObjectModel,
    view: &ViewHandle,
    poly_data: PolyData,
    name: &str,
    options: &ShowOptions,
) -> Result<ItemId> {
    let mut item = PolyDataItem::new(name, poly_data)?;
    apply_show_options(&mut item, options)?;
    add_and_attach(om, view, item.into(), &options.parent)
}

pub fn show_affordance(
    om: &mut ObjectModel,
    view: &ViewHandle,
    mut item: AffordanceItem,
    options: &ShowOptions,
) -> Result<ItemId> {
    apply_show_options(item.poly_mut(), options)?;
    add_and_attach(om, view, item.into(), &options.parent)
}

pub fn show_frame(
    om: &mut ObjectModel,
    view: &ViewHandle,
    transform: Transform,
    name: &str,
    options: &FrameOptions,
) -> Result<Rc<FrameItem>> {
    let frame = FrameItem::new(name, transform)?;
    frame.set_property(VISIBLE_PROPERTY, options.visible)?;
    frame.set_property(SCALE_PROPERTY, options.scale)?;
    add_and_attach(om, view, frame.clone().into(), &options.parent)?;
    Ok(frame)
}

/// Replace the dataset of the item named `name`, showing it first if no
/// such item exists
pub fn update_poly_data(
    om: &mut ObjectModel,
    view: &ViewHandle,
    poly_data: PolyData,
    name: &str,
    options: &ShowOptions,
) -> Result<ItemId> {
    let Some(id) = om.find_object_by_name(name) else {
        return show_poly_data(om, view, poly_data, name, options);
    };

    match om.get_mut(id) {
        Some(SceneObject::PolyData(item)) => item.set_poly_data(poly_data),
        Some(SceneObject::Affordance(item)) => item.poly_mut().set_poly_data(poly_data),
        _ => return Err(PerceptError::DuplicateItemName(name.to_string())),
    }
    Ok(id)
}

/// Move the frame named `name` to `transform`, showing the frame first if it
/// does not exist. Listeners are notified, so sync groups follow.
pub fn update_frame(
    om: &mut ObjectModel,
    view: &ViewHandle,
    transform: Transform,
    name: &str,
    options: &FrameOptions,
) -> Result<Rc<FrameItem>> {
    let Some(id) = om.find_object_by_name(name) else {
        return show_frame(om, view, transform, name, options);
    };

    let frame = om
        .frame(id)
        .ok_or_else(|| PerceptError::DuplicateItemName(name.to_string()))?;
    frame.set_transform(transform);
    Ok(frame)
}

/// Cycled through by [`show_cluster_objects`]
const CLUSTER_COLORS: [Color; 9] = [
    Color::RED,
    Color::BLUE,
    Color::YELLOW,
    Color::MAGENTA,
    Color::CYAN,
    Color::GREEN,
    Color::rgb(0.0, 0.5, 0.5),
    Color::rgb(0.0, 0.5, 0.0),
    Color::rgb(0.5, 0.0, 0.5),
];

/// One segmented object: its mesh, pose, bounding box and member points
#[derive(Debug, Clone)]
pub struct Cluster {
    pub mesh: PolyData,
    pub frame: Transform,
    pub bounding_box: PolyData,
    pub points: PolyData,
}

/// Show each cluster as "object N" under `parent`, with a hidden
/// "object N frame", an "object N box" and "object N points" as children.
/// Returns the ids of the "object N" items.
pub fn show_cluster_objects(
    om: &mut ObjectModel,
    view: &ViewHandle,
    clusters: Vec<Cluster>,
    parent: impl Into<ParentRef>,
) -> Result<Vec<ItemId>> {
    let parent = parent.into();
    let mut objects = Vec::with_capacity(clusters.len());

    for (i, cluster) in clusters.into_iter().enumerate() {
        let name = format!("object {}", i);
        let color = CLUSTER_COLORS[i % CLUSTER_COLORS.len()];
        let base = ShowOptions::default().with_color(color);

        let object = show_poly_data(
            om,
            view,
            cluster.mesh,
            &name,
            &base.clone().with_alpha(0.25).with_parent(parent.clone()),
        )?;
        show_frame(
            om,
            view,
            cluster.frame,
            &format!("{} frame", name),
            &FrameOptions::default()
                .with_scale(0.2)
                .with_visible(false)
                .with_parent(object),
        )?;
        show_poly_data(
            om,
            view,
            cluster.bounding_box,
            &format!("{} box", name),
            &base.clone().with_alpha(0.6).with_parent(object),
        )?;
        let mut points = base.with_alpha(1.0).with_parent(object);
        points.point_size = 7.0;
        show_poly_data(om, view, cluster.points, &format!("{} points", name), &points)?;

        objects.push(object);
    }

    log::debug!("showed {} cluster object(s)", objects.len());
    Ok(objects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affordance::AffordanceKind;
    use crate::frame_sync::FrameSync;
    use crate::poly_data::COLOR_PROPERTY;
    use crate::view::HeadlessView;
    use glam::DVec3;
    use percept_props::PropertyValue;
    use std::cell::Cell;

    fn setup() -> (ObjectModel, Rc<HeadlessView>, ViewHandle) {
        let view = Rc::new(HeadlessView::new("main"));
        let handle = ViewHandle::from_rc(view.clone());
        (ObjectModel::new(), view, handle)
    }

    #[test]
    fn test_show_poly_data_defaults() {
        let (mut om, view, handle) = setup();
        let id = show_poly_data(
            &mut om,
            &handle,
            PolyData::new(10),
            "cloud",
            &ShowOptions::default(),
        )
        .unwrap();

        let seg = om.find_object_by_name("segmentation").unwrap();
        assert_eq!(om.parent(id), Some(seg));
        assert!(view.contains_actor(id));
        assert!(om.get(seg).unwrap().views().is_empty());
        assert_eq!(
            om.get(id).unwrap().property(ALPHA_PROPERTY),
            Some(PropertyValue::Float(1.0))
        );
    }

    #[test]
    fn test_show_poly_data_options() {
        let (mut om, _view, handle) = setup();
        let parent = om.add_container("planning", None).unwrap();
        let options = ShowOptions::default()
            .with_color(Color::RED)
            .with_alpha(0.25)
            .with_visible(false)
            .with_parent(parent);

        let id = show_poly_data(&mut om, &handle, PolyData::new(10), "goal", &options).unwrap();
        let item = om.get(id).and_then(SceneObject::as_poly_data).unwrap();

        assert_eq!(om.parent(id), Some(parent));
        assert!(!item.is_visible());
        assert!(!item.actor().visible);
        assert_eq!(item.actor().opacity, 0.25);
        assert_eq!(item.property(COLOR_PROPERTY), Some(&PropertyValue::Color(Color::RED)));
        assert!(!item.actor().scalar_visibility);
    }

    #[test]
    fn test_show_poly_data_color_by() {
        let (mut om, _view, handle) = setup();
        let data = PolyData::new(10).with_array("intensity", (0.0, 255.0));
        let options = ShowOptions::default().with_color_by("intensity", Some((0.0, 100.0)));

        let id = show_poly_data(&mut om, &handle, data, "scan", &options).unwrap();
        let item = om.get(id).and_then(SceneObject::as_poly_data).unwrap();

        assert_eq!(item.color_by_array_name().as_deref(), Some("intensity"));
        assert_eq!(item.actor().lookup_table.as_ref().map(|l| l.range), Some((0.0, 100.0)));
    }

    #[test]
    fn test_show_into_missing_parent_fails() {
        let (mut om, view, handle) = setup();
        let options = ShowOptions::default().with_parent(ItemId::new());

        let result = show_poly_data(&mut om, &handle, PolyData::new(1), "cloud", &options);
        assert!(matches!(result, Err(PerceptError::ItemNotFound(_))));
        assert!(om.is_empty());
        assert_eq!(view.actors().len(), 0);
    }

    #[test]
    fn test_show_frame() {
        let (mut om, view, handle) = setup();
        let t = Transform::from_translation(DVec3::new(1.0, 0.0, 0.0));
        let frame = show_frame(&mut om, &handle, t, "hand frame", &FrameOptions::default()).unwrap();

        assert_eq!(frame.transform(), t);
        assert_eq!(frame.property(SCALE_PROPERTY), Some(PropertyValue::Float(0.35)));
        assert!(view.contains_actor(frame.id()));
        assert_eq!(om.frame(frame.id()).map(|f| f.id()), Some(frame.id()));
    }

    #[test]
    fn test_update_frame_moves_sync_group() {
        let (mut om, _view, handle) = setup();
        let options = FrameOptions::default();
        let a = show_frame(&mut om, &handle, Transform::IDENTITY, "a", &options).unwrap();
        let b = show_frame(
            &mut om,
            &handle,
            Transform::from_translation(DVec3::X),
            "b",
            &options,
        )
        .unwrap();
        let sync = FrameSync::new();
        sync.add_frame(&a, false);
        sync.add_frame(&b, false);
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        a.connect_frame_modified(move |_| h.set(h.get() + 1));

        let t = Transform::from_translation(DVec3::new(2.0, 0.0, 0.0));
        let same = update_frame(&mut om, &handle, t, "a", &options).unwrap();

        assert!(Rc::ptr_eq(&a, &same));
        assert_eq!(a.transform(), t);
        assert!((b.transform().position().x - 3.0).abs() < 1e-9);
        assert_eq!(hits.get(), 1);
        assert_eq!(om.len(), 3);
    }

    #[test]
    fn test_update_frame_shows_missing_frame() {
        let (mut om, view, handle) = setup();
        let t = Transform::from_translation(DVec3::Z);
        let frame = update_frame(&mut om, &handle, t, "goal", &FrameOptions::default()).unwrap();

        assert_eq!(frame.transform(), t);
        assert!(view.contains_actor(frame.id()));
        assert_eq!(om.find_object_by_name("goal"), Some(frame.id()));
    }

    #[test]
    fn test_show_cluster_objects() {
        let (mut om, view, handle) = setup();
        let parent = om.add_container("clusters", None).unwrap();
        let clusters: Vec<Cluster> = (0..10)
            .map(|i| Cluster {
                mesh: PolyData::new(100),
                frame: Transform::from_translation(DVec3::new(i as f64, 0.0, 0.0)),
                bounding_box: PolyData::new(8),
                points: PolyData::new(50).with_array("intensity", (0.0, 1.0)),
            })
            .collect();

        let objects = show_cluster_objects(&mut om, &handle, clusters, parent).unwrap();
        assert_eq!(objects.len(), 10);
        assert_eq!(om.children(parent), objects.as_slice());
        assert_eq!(om.len(), 1 + 10 * 4);

        let first = om.get(objects[0]).and_then(SceneObject::as_poly_data).unwrap();
        assert_eq!(first.name(), "object 0");
        assert_eq!(first.actor().opacity, 0.25);
        assert_eq!(first.actor().color, Color::RED);
        // the palette wraps after nine clusters
        let last = om.get(objects[9]).and_then(SceneObject::as_poly_data).unwrap();
        assert_eq!(last.actor().color, Color::RED);

        let frame = om.child_frame(objects[1]).unwrap();
        assert!(!frame.is_visible());
        assert_eq!(frame.property(SCALE_PROPERTY), Some(PropertyValue::Float(0.2)));
        assert_eq!(frame.transform().position(), DVec3::X);

        let box_id = om.find_child(objects[1], "object 1 box").unwrap();
        let bounding_box = om.get(box_id).and_then(SceneObject::as_poly_data).unwrap();
        assert_eq!(bounding_box.actor().opacity, 0.6);
        assert_eq!(bounding_box.actor().color, Color::BLUE);

        let points_id = om.find_child(objects[1], "object 1 points").unwrap();
        let points = om.get(points_id).and_then(SceneObject::as_poly_data).unwrap();
        assert_eq!(points.actor().point_size, 7.0);
        assert!(!points.actor().scalar_visibility);
        assert!(view.contains_actor(points_id));
    }

    #[test]
    fn test_update_poly_data() {
        let (mut om, _view, handle) = setup();
        let options = ShowOptions::default();
        let first = update_poly_data(&mut om, &handle, PolyData::new(1), "scan", &options).unwrap();
        let second =
            update_poly_data(&mut om, &handle, PolyData::new(50), "scan", &options).unwrap();

        assert_eq!(first, second);
        let item = om.get(first).and_then(SceneObject::as_poly_data).unwrap();
        assert_eq!(item.poly_data().number_of_points, 50);

        assert!(matches!(
            update_poly_data(&mut om, &handle, PolyData::new(1), "segmentation", &options),
            Err(PerceptError::DuplicateItemName(_))
        ));
    }

    #[test]
    fn test_show_affordance() {
        let (mut om, view, handle) = setup();
        let aff = AffordanceItem::new("box", AffordanceKind::Block, PolyData::new(8)).unwrap();
        let id = show_affordance(
            &mut om,
            &handle,
            aff,
            &ShowOptions::default().with_color(Color::GREEN),
        )
        .unwrap();

        assert!(view.contains_actor(id));
        assert_eq!(om.registered_affordances(), vec![id]);
    }
}
