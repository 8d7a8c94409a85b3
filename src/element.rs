use std::collections::BTreeSet;

use crate::error::{SceneKeyError, SceneKeyResult};

/// A node in the scene tree.
///
/// Geometry is relative to the parent's coordinate origin; rotation is in
/// degrees. Identity must be unique across the whole tree regardless of
/// nesting depth, which [`validate_unique_ids`] enforces at the boundary.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    #[serde(flatten)]
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    #[serde(default = "one")]
    pub scale_x: f64,
    #[serde(default = "one")]
    pub scale_y: f64,
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    #[serde(default)]
    pub corner_radius: f64,
    #[serde(default = "one")]
    pub opacity: f64,
    #[serde(default)]
    pub filters: Filters,
    #[serde(default = "yes")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub z: i32,
}

fn one() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ElementKind {
    Shape {
        variant: ShapeVariant,
    },
    Text(TextAttrs),
    Image {
        source: String,
    },
    Path {
        /// `[x, y]` pairs in the element's local space.
        points: Vec<[f64; 2]>,
        closed: bool,
        #[serde(default = "one")]
        tension: f64,
    },
    Group {
        children: Vec<Element>,
    },
    Mask {
        children: Vec<Element>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeVariant {
    Rectangle,
    Ellipse,
    Triangle,
    Line,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAttrs {
    pub content: String,
    pub font_family: String,
    pub font_size: f64,
    #[serde(default)]
    pub letter_spacing: f64,
    #[serde(default = "one")]
    pub line_spacing: f64,
    pub color: String,
}

/// Per-filter numeric values; defaults are the identity filter chain.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub blur: f64,
    pub brightness: f64,
    pub contrast: f64,
    pub hue_rotate: f64,
    pub saturate: f64,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            blur: 0.0,
            brightness: 1.0,
            contrast: 1.0,
            hue_rotate: 0.0,
            saturate: 1.0,
        }
    }
}

/// Identifies one animatable property of an element.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum PropKey {
    X,
    Y,
    Width,
    Height,
    Rotation,
    Opacity,
    ScaleX,
    ScaleY,
    StrokeWidth,
    CornerRadius,
    FontSize,
    LetterSpacing,
    LineSpacing,
    Blur,
    Brightness,
    Contrast,
    HueRotate,
    Saturate,
    Fill,
    Stroke,
    TextColor,
}

impl PropKey {
    pub const ALL: [PropKey; 21] = [
        PropKey::X,
        PropKey::Y,
        PropKey::Width,
        PropKey::Height,
        PropKey::Rotation,
        PropKey::Opacity,
        PropKey::ScaleX,
        PropKey::ScaleY,
        PropKey::StrokeWidth,
        PropKey::CornerRadius,
        PropKey::FontSize,
        PropKey::LetterSpacing,
        PropKey::LineSpacing,
        PropKey::Blur,
        PropKey::Brightness,
        PropKey::Contrast,
        PropKey::HueRotate,
        PropKey::Saturate,
        PropKey::Fill,
        PropKey::Stroke,
        PropKey::TextColor,
    ];

    pub fn is_color(self) -> bool {
        matches!(self, Self::Fill | Self::Stroke | Self::TextColor)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Number(f64),
    Color(String),
}

impl PropValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Color(s) => Some(s),
        }
    }
}

impl Element {
    pub fn children(&self) -> Option<&Vec<Element>> {
        match &self.kind {
            ElementKind::Group { children } | ElementKind::Mask { children } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Element>> {
        match &mut self.kind {
            ElementKind::Group { children } | ElementKind::Mask { children } => Some(children),
            _ => None,
        }
    }

    fn text(&self) -> Option<&TextAttrs> {
        match &self.kind {
            ElementKind::Text(t) => Some(t),
            _ => None,
        }
    }

    fn text_mut(&mut self) -> Option<&mut TextAttrs> {
        match &mut self.kind {
            ElementKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// The smoothed outline of a path element; `None` for every other kind.
    pub fn outline(&self) -> Option<kurbo::BezPath> {
        let ElementKind::Path {
            points,
            closed,
            tension,
        } = &self.kind
        else {
            return None;
        };
        let points: Vec<kurbo::Point> = points
            .iter()
            .map(|&[x, y]| kurbo::Point::new(x, y))
            .collect();
        let mut path = crate::spline::solve_spline(&points, *tension);
        if *closed && !path.elements().is_empty() {
            path.close_path();
        }
        Some(path)
    }

    /// The element's persisted value for one animatable property.
    ///
    /// This is the explicit fallback the interpolation engine uses for
    /// properties missing from a keyframe snapshot. Text-only keys return
    /// `None` on non-text elements.
    pub fn base_value(&self, key: PropKey) -> Option<PropValue> {
        let num = |n: f64| Some(PropValue::Number(n));
        let color = |s: &str| Some(PropValue::Color(s.to_string()));
        match key {
            PropKey::X => num(self.x),
            PropKey::Y => num(self.y),
            PropKey::Width => num(self.width),
            PropKey::Height => num(self.height),
            PropKey::Rotation => num(self.rotation),
            PropKey::Opacity => num(self.opacity),
            PropKey::ScaleX => num(self.scale_x),
            PropKey::ScaleY => num(self.scale_y),
            PropKey::StrokeWidth => num(self.stroke_width),
            PropKey::CornerRadius => num(self.corner_radius),
            PropKey::FontSize => self.text().and_then(|t| num(t.font_size)),
            PropKey::LetterSpacing => self.text().and_then(|t| num(t.letter_spacing)),
            PropKey::LineSpacing => self.text().and_then(|t| num(t.line_spacing)),
            PropKey::Blur => num(self.filters.blur),
            PropKey::Brightness => num(self.filters.brightness),
            PropKey::Contrast => num(self.filters.contrast),
            PropKey::HueRotate => num(self.filters.hue_rotate),
            PropKey::Saturate => num(self.filters.saturate),
            PropKey::Fill => color(&self.fill),
            PropKey::Stroke => color(&self.stroke),
            PropKey::TextColor => self.text().and_then(|t| color(&t.color)),
        }
    }

    /// Writes one property override in place. Type-mismatched or
    /// inapplicable values are ignored rather than surfaced.
    pub fn apply_override(&mut self, key: PropKey, value: &PropValue) {
        if key.is_color() {
            let Some(c) = value.as_color() else { return };
            match key {
                PropKey::Fill => self.fill = c.to_string(),
                PropKey::Stroke => self.stroke = c.to_string(),
                PropKey::TextColor => {
                    if let Some(t) = self.text_mut() {
                        t.color = c.to_string();
                    }
                }
                _ => unreachable!(),
            }
            return;
        }

        let Some(n) = value.as_number() else { return };
        match key {
            PropKey::X => self.x = n,
            PropKey::Y => self.y = n,
            PropKey::Width => self.width = n,
            PropKey::Height => self.height = n,
            PropKey::Rotation => self.rotation = n,
            PropKey::Opacity => self.opacity = n,
            PropKey::ScaleX => self.scale_x = n,
            PropKey::ScaleY => self.scale_y = n,
            PropKey::StrokeWidth => self.stroke_width = n,
            PropKey::CornerRadius => self.corner_radius = n,
            PropKey::FontSize => {
                if let Some(t) = self.text_mut() {
                    t.font_size = n;
                }
            }
            PropKey::LetterSpacing => {
                if let Some(t) = self.text_mut() {
                    t.letter_spacing = n;
                }
            }
            PropKey::LineSpacing => {
                if let Some(t) = self.text_mut() {
                    t.line_spacing = n;
                }
            }
            PropKey::Blur => self.filters.blur = n,
            PropKey::Brightness => self.filters.brightness = n,
            PropKey::Contrast => self.filters.contrast = n,
            PropKey::HueRotate => self.filters.hue_rotate = n,
            PropKey::Saturate => self.filters.saturate = n,
            PropKey::Fill | PropKey::Stroke | PropKey::TextColor => unreachable!(),
        }
    }
}

/// Finds an element anywhere in the forest by id.
pub fn find_element<'a>(elements: &'a [Element], id: &str) -> Option<&'a Element> {
    for el in elements {
        if el.id == id {
            return Some(el);
        }
        if let Some(children) = el.children()
            && let Some(found) = find_element(children, id)
        {
            return Some(found);
        }
    }
    None
}

pub fn find_element_mut<'a>(elements: &'a mut [Element], id: &str) -> Option<&'a mut Element> {
    for el in elements {
        if el.id == id {
            return Some(el);
        }
        if let Some(children) = el.children_mut()
            && let Some(found) = find_element_mut(children, id)
        {
            return Some(found);
        }
    }
    None
}

/// Detaches the subtree rooted at `id`, returning it if found.
pub fn remove_element(elements: &mut Vec<Element>, id: &str) -> Option<Element> {
    if let Some(pos) = elements.iter().position(|el| el.id == id) {
        return Some(elements.remove(pos));
    }
    for el in elements {
        if let Some(children) = el.children_mut()
            && let Some(removed) = remove_element(children, id)
        {
            return Some(removed);
        }
    }
    None
}

pub fn collect_ids(elements: &[Element], out: &mut Vec<String>) {
    for el in elements {
        out.push(el.id.clone());
        if let Some(children) = el.children() {
            collect_ids(children, out);
        }
    }
}

pub fn validate_unique_ids(elements: &[Element]) -> SceneKeyResult<()> {
    let mut ids = Vec::new();
    collect_ids(elements, &mut ids);
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id.clone()) {
            return Err(SceneKeyError::validation(format!(
                "duplicate element id '{id}'"
            )));
        }
    }
    Ok(())
}

/// Moves `id` under `new_parent` (or to the root when `None`).
///
/// The operation is a silent no-op whenever it would corrupt the tree: the
/// element or target is missing, the target cannot hold children, or the
/// target sits inside the moved subtree.
pub fn reparent(elements: &mut Vec<Element>, id: &str, new_parent: Option<&str>) {
    if find_element(elements, id).is_none() {
        return;
    }
    if let Some(parent_id) = new_parent {
        if parent_id == id {
            return;
        }
        let Some(parent) = find_element(elements, parent_id) else {
            return;
        };
        if parent.children().is_none() {
            return;
        }
        let Some(subtree) = find_element(elements, id) else {
            return;
        };
        let descendants: &[Element] = subtree.children().map_or(&[], |c| c.as_slice());
        if find_element(descendants, parent_id).is_some() {
            return;
        }
    }

    let Some(detached) = remove_element(elements, id) else {
        return;
    };
    match new_parent {
        None => elements.push(detached),
        Some(parent_id) => {
            // Checked before detaching, so the parent is still present.
            if let Some(parent) = find_element_mut(elements, parent_id)
                && let Some(children) = parent.children_mut()
            {
                children.push(detached);
            }
        }
    }
}

/// Deep-copies the element as a sibling of the original, assigning fresh
/// derived ids throughout the copied subtree. Returns the new root id.
pub fn duplicate_element(elements: &mut Vec<Element>, id: &str) -> Option<String> {
    let mut existing = Vec::new();
    collect_ids(elements, &mut existing);
    let existing: BTreeSet<String> = existing.into_iter().collect();

    let (siblings, pos) = find_sibling_list(elements, id)?;
    let mut copy = siblings[pos].clone();
    let mut taken = existing;
    remap_ids(&mut copy, &mut taken);
    let new_id = copy.id.clone();

    let (siblings, pos) = find_sibling_list(elements, id)?;
    siblings.insert(pos + 1, copy);
    Some(new_id)
}

fn find_sibling_list<'a>(
    elements: &'a mut Vec<Element>,
    id: &str,
) -> Option<(&'a mut Vec<Element>, usize)> {
    if let Some(pos) = elements.iter().position(|el| el.id == id) {
        return Some((elements, pos));
    }
    for el in elements {
        if let Some(children) = el.children_mut()
            && let Some(found) = find_sibling_list(children, id)
        {
            return Some(found);
        }
    }
    None
}

fn remap_ids(el: &mut Element, taken: &mut BTreeSet<String>) {
    el.id = fresh_id(&el.id, taken);
    taken.insert(el.id.clone());
    if let Some(children) = el.children_mut() {
        for child in children {
            remap_ids(child, taken);
        }
    }
}

fn fresh_id(base: &str, taken: &BTreeSet<String>) -> String {
    let candidate = format!("{base}-copy");
    if !taken.contains(&candidate) {
        return candidate;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-copy-{n}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
