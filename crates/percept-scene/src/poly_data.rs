//! Point clouds and meshes

use crate::item::{SceneItem, VISIBLE_PROPERTY};
use crate::view::ViewHandle;
use percept_core::{Color, DataSetId, ItemId, Result};
use percept_props::{PropertyAttributes, PropertyValue};
use serde::{Deserialize, Serialize};

pub const POINT_SIZE_PROPERTY: &str = "Point Size";
pub const ALPHA_PROPERTY: &str = "Alpha";
pub const COLOR_PROPERTY: &str = "Color";

/// A named per-point scalar array and its value range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataArray {
    pub name: String,
    pub range: (f64, f64),
}

/// Descriptor of a dataset held by the rendering toolkit
#[derive(Debug, Clone, PartialEq)]
pub struct PolyData {
    id: DataSetId,
    pub number_of_points: usize,
    /// Axis-aligned bounds `[xmin, xmax, ymin, ymax, zmin, zmax]`, if known
    pub bounds: Option<[f64; 6]>,
    arrays: Vec<DataArray>,
    active_scalars: Option<String>,
}

impl PolyData {
    pub fn new(number_of_points: usize) -> Self {
        Self {
            id: DataSetId::new(),
            number_of_points,
            bounds: None,
            arrays: Vec::new(),
            active_scalars: None,
        }
    }

    pub fn with_array(mut self, name: impl Into<String>, range: (f64, f64)) -> Self {
        self.arrays.push(DataArray {
            name: name.into(),
            range,
        });
        self
    }

    /// The three colored axis lines drawn for a coordinate frame
    pub fn axes(scale: f64) -> Self {
        let mut axes = Self::new(6).with_array("Axes", (0.0, 0.5));
        axes.bounds = Some([0.0, scale, 0.0, scale, 0.0, scale]);
        axes
    }

    pub fn id(&self) -> DataSetId {
        self.id
    }

    pub fn arrays(&self) -> &[DataArray] {
        &self.arrays
    }

    pub fn array(&self, name: &str) -> Option<&DataArray> {
        self.arrays.iter().find(|a| a.name == name)
    }

    pub fn array_names(&self) -> Vec<&str> {
        self.arrays.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn active_scalars(&self) -> Option<&str> {
        self.active_scalars.as_deref()
    }

    fn set_active_scalars(&mut self, name: Option<&str>) {
        self.active_scalars = name.map(String::from);
    }
}

/// Maps scalar values to colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupTable {
    pub number_of_colors: usize,
    pub hue_range: (f64, f64),
    pub range: (f64, f64),
}

impl LookupTable {
    /// Blue-to-red table over `range`
    pub fn new(range: (f64, f64)) -> Self {
        Self {
            number_of_colors: 256,
            hue_range: (0.667, 0.0),
            range,
        }
    }

    pub fn with_hue_range(mut self, hue_range: (f64, f64)) -> Self {
        self.hue_range = hue_range;
        self
    }
}

/// Visual state handed to the renderer for an item's actor
#[derive(Debug, Clone, PartialEq)]
pub struct ActorProperties {
    pub visible: bool,
    pub opacity: f64,
    pub point_size: f64,
    pub color: Color,
    pub scalar_visibility: bool,
    pub lookup_table: Option<LookupTable>,
}

impl Default for ActorProperties {
    fn default() -> Self {
        Self {
            visible: true,
            opacity: 1.0,
            point_size: 1.0,
            color: Color::WHITE,
            scalar_visibility: false,
            lookup_table: None,
        }
    }
}

/// A renderable dataset in the object model
#[derive(Debug)]
pub struct PolyDataItem {
    item: SceneItem,
    poly_data: PolyData,
    actor: ActorProperties,
}

impl PolyDataItem {
    pub fn new(name: impl Into<String>, poly_data: PolyData) -> Result<Self> {
        let actor = ActorProperties::default();
        let mut item = SceneItem::new(name)?;
        item.add_property(VISIBLE_PROPERTY, true, PropertyAttributes::default())?;
        item.add_property(
            POINT_SIZE_PROPERTY,
            actor.point_size,
            PropertyAttributes::range(1.0, 20.0)
                .with_decimals(0)
                .with_single_step(1.0),
        )?;
        item.add_property(
            ALPHA_PROPERTY,
            1.0,
            PropertyAttributes::range(0.0, 1.0)
                .with_decimals(2)
                .with_single_step(0.1),
        )?;
        item.add_property(COLOR_PROPERTY, Color::WHITE, PropertyAttributes::default())?;

        Ok(Self {
            item,
            poly_data,
            actor,
        })
    }

    pub fn id(&self) -> ItemId {
        self.item.id()
    }

    pub fn name(&self) -> &str {
        self.item.name()
    }

    pub fn item(&self) -> &SceneItem {
        &self.item
    }

    pub fn poly_data(&self) -> &PolyData {
        &self.poly_data
    }

    pub fn actor(&self) -> &ActorProperties {
        &self.actor
    }

    pub fn actor_mut(&mut self) -> &mut ActorProperties {
        &mut self.actor
    }

    pub fn has_data_set(&self, id: DataSetId) -> bool {
        self.poly_data.id() == id
    }

    pub fn is_visible(&self) -> bool {
        self.item.is_visible()
    }

    /// Replace the dataset, keeping the current color-by array and lookup table
    pub fn set_poly_data(&mut self, poly_data: PolyData) {
        let array_name = self.color_by_array_name();
        let lut = self.actor.lookup_table.clone();

        self.poly_data = poly_data;
        self.color_by(array_name.as_deref(), None, lut);

        if self.is_visible() {
            self.item.render_all_views();
        }
    }

    pub fn color_by_array_name(&self) -> Option<String> {
        self.poly_data.active_scalars().map(String::from)
    }

    pub fn array_names(&self) -> Vec<&str> {
        self.poly_data.array_names()
    }

    pub fn set_solid_color(&mut self, color: Color) -> Result<()> {
        self.set_property(COLOR_PROPERTY, color)?;
        self.color_by(None, None, None);
        Ok(())
    }

    /// Color by a scalar array, or switch to solid color when `array_name` is `None`.
    ///
    /// Without an explicit lookup table one is built over `scalar_range`,
    /// falling back to the array's own range.
    pub fn color_by(
        &mut self,
        array_name: Option<&str>,
        scalar_range: Option<(f64, f64)>,
        lut: Option<LookupTable>,
    ) {
        let Some(array_name) = array_name else {
            self.scalar_visibility_off();
            return;
        };

        let Some(array) = self.poly_data.array(array_name) else {
            log::warn!(
                "color_by({}): array not found on '{}'",
                array_name,
                self.item.name()
            );
            self.scalar_visibility_off();
            return;
        };

        let lut = lut.unwrap_or_else(|| LookupTable::new(scalar_range.unwrap_or(array.range)));
        self.poly_data.set_active_scalars(Some(array_name));
        self.actor.scalar_visibility = true;
        self.actor.lookup_table = Some(lut);

        if self.is_visible() {
            self.item.render_all_views();
        }
    }

    fn scalar_visibility_off(&mut self) {
        self.actor.scalar_visibility = false;
        self.poly_data.set_active_scalars(None);
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.item.property(name)
    }

    pub fn add_property(
        &mut self,
        name: impl Into<String>,
        default: impl Into<PropertyValue>,
        attributes: PropertyAttributes,
    ) -> Result<()> {
        self.item.add_property(name, default, attributes)
    }

    pub fn set_property(&mut self, name: &str, value: impl Into<PropertyValue>) -> Result<()> {
        self.item.set_property(name, value)?;
        self.on_property_changed(name);
        Ok(())
    }

    fn on_property_changed(&mut self, name: &str) {
        let props = self.item.properties();
        match name {
            POINT_SIZE_PROPERTY => {
                self.actor.point_size = props.get_float(name).unwrap_or(self.actor.point_size)
            }
            ALPHA_PROPERTY => self.actor.opacity = props.get_float(name).unwrap_or(1.0),
            VISIBLE_PROPERTY => self.actor.visible = props.get_bool(name).unwrap_or(true),
            COLOR_PROPERTY => self.actor.color = props.get_color(name).unwrap_or_default(),
            _ => {}
        }

        self.item.render_all_views();
    }

    pub fn views(&self) -> &[ViewHandle] {
        self.item.views()
    }

    pub fn add_to_view(&mut self, view: &ViewHandle) {
        self.item.add_to_view(view);
    }

    pub fn remove_from_view(&mut self, view: &ViewHandle) -> Result<()> {
        self.item.remove_from_view(view)
    }

    pub fn remove_from_all_views(&mut self) {
        self.item.remove_from_all_views();
    }

    pub fn render_all_views(&self) {
        self.item.render_all_views();
    }

    pub fn on_remove_from_object_model(&mut self) {
        self.remove_from_all_views();
        debug_assert!(self.views().is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::HeadlessView;
    use percept_core::PerceptError;
    use std::rc::Rc;

    fn cloud() -> PolyData {
        PolyData::new(100)
            .with_array("intensity", (0.0, 255.0))
            .with_array("z", (-1.0, 3.0))
    }

    #[test]
    fn test_default_properties() {
        let item = PolyDataItem::new("cloud", cloud()).unwrap();
        let names = item.item().properties().property_names();
        assert_eq!(names, vec!["Name", "Visible", "Point Size", "Alpha", "Color"]);
        assert_eq!(item.actor(), &ActorProperties::default());
    }

    #[test]
    fn test_property_effects_and_render() {
        let view = Rc::new(HeadlessView::new("main"));
        let mut item = PolyDataItem::new("cloud", cloud()).unwrap();
        item.add_to_view(&ViewHandle::from_rc(view.clone()));
        let renders = view.render_count();

        item.set_property(ALPHA_PROPERTY, 0.25).unwrap();
        item.set_property(POINT_SIZE_PROPERTY, 7).unwrap();
        item.set_property(VISIBLE_PROPERTY, false).unwrap();
        item.set_property(COLOR_PROPERTY, Color::RED).unwrap();

        assert_eq!(item.actor().opacity, 0.25);
        assert_eq!(item.actor().point_size, 7.0);
        assert!(!item.actor().visible);
        assert_eq!(item.actor().color, Color::RED);
        assert_eq!(view.render_count(), renders + 4);
    }

    #[test]
    fn test_invalid_property_value() {
        let mut item = PolyDataItem::new("cloud", cloud()).unwrap();
        assert!(item
            .set_property(POINT_SIZE_PROPERTY, 50.0)
            .unwrap_err()
            .is_invalid_value());
        assert_eq!(item.actor().point_size, 1.0);
    }

    #[test]
    fn test_color_by() {
        let mut item = PolyDataItem::new("cloud", cloud()).unwrap();

        item.color_by(Some("z"), None, None);
        assert!(item.actor().scalar_visibility);
        assert_eq!(item.color_by_array_name().as_deref(), Some("z"));
        assert_eq!(item.actor().lookup_table.as_ref().unwrap().range, (-1.0, 3.0));

        item.color_by(Some("intensity"), Some((0.0, 10.0)), None);
        assert_eq!(item.actor().lookup_table.as_ref().unwrap().range, (0.0, 10.0));
    }

    #[test]
    fn test_color_by_missing_array_turns_scalars_off() {
        let mut item = PolyDataItem::new("cloud", cloud()).unwrap();
        item.color_by(Some("z"), None, None);

        item.color_by(Some("rgb"), None, None);
        assert!(!item.actor().scalar_visibility);
        assert_eq!(item.color_by_array_name(), None);
    }

    #[test]
    fn test_set_poly_data_keeps_color_by() {
        let mut item = PolyDataItem::new("cloud", cloud()).unwrap();
        let lut = LookupTable::new((0.0, 1.0)).with_hue_range((0.0, 0.667));
        item.color_by(Some("z"), None, Some(lut.clone()));

        let next = cloud();
        let next_id = next.id();
        item.set_poly_data(next);

        assert!(item.has_data_set(next_id));
        assert_eq!(item.color_by_array_name().as_deref(), Some("z"));
        assert_eq!(item.actor().lookup_table, Some(lut));
    }

    #[test]
    fn test_set_solid_color() {
        let mut item = PolyDataItem::new("cloud", cloud()).unwrap();
        item.color_by(Some("z"), None, None);
        item.set_solid_color(Color::GREEN).unwrap();
        assert!(!item.actor().scalar_visibility);
        assert_eq!(item.actor().color, Color::GREEN);
    }

    #[test]
    fn test_remove_from_object_model_detaches() {
        let view = Rc::new(HeadlessView::new("main"));
        let handle = ViewHandle::from_rc(view.clone());
        let mut item = PolyDataItem::new("cloud", cloud()).unwrap();
        item.add_to_view(&handle);

        item.on_remove_from_object_model();
        assert!(item.views().is_empty());
        assert!(view.actors().is_empty());
        assert!(matches!(
            item.remove_from_view(&handle),
            Err(PerceptError::NotAttached(_))
        ));
    }
}
