use super::GeometryError;

/// Scalar type of each attribute component in the vertex bytes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ComponentType {
    F32,
    F16,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
}

impl ComponentType {
    #[inline]
    pub const fn byte_size(self) -> u32 {
        match self {
            ComponentType::I8 | ComponentType::U8 => 1,
            ComponentType::F16 | ComponentType::I16 | ComponentType::U16 => 2,
            ComponentType::F32 | ComponentType::I32 | ComponentType::U32 => 4,
        }
    }
}

/// One shader input in the interleaved vertex bytes.
///
/// `stride` and `offset` are in bytes. `normalized` only affects integer
/// component types.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttribute {
    pub index: u32,
    pub components: u8,
    pub component_type: ComponentType,
    pub normalized: bool,
    pub stride: u32,
    pub offset: u32,
}

impl VertexAttribute {
    /// `components` floats at `offset` bytes, `stride` bytes apart.
    #[inline]
    pub const fn f32(index: u32, components: u8, stride: u32, offset: u32) -> Self {
        Self {
            index,
            components,
            component_type: ComponentType::F32,
            normalized: false,
            stride,
            offset,
        }
    }

    /// Bytes this attribute reads per vertex.
    #[inline]
    pub const fn byte_size(&self) -> u32 {
        self.components as u32 * self.component_type.byte_size()
    }

    /// First byte past this attribute within a vertex, or `None` if it does
    /// not fit in `u32`.
    #[inline]
    pub const fn end(&self) -> Option<u32> {
        self.offset.checked_add(self.byte_size())
    }
}

/// Ordered attribute descriptors for one vertex buffer.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub fn new(attributes: Vec<VertexAttribute>) -> Self {
        Self { attributes }
    }

    /// Tightly packed interleaved floats.
    ///
    /// `attributes` lists `(shader location, component count)` in the order
    /// they appear within a vertex; stride and offsets are derived.
    ///
    /// ```
    /// use glint_engine::geometry::VertexLayout;
    ///
    /// // vec3 position, then vec3 color
    /// let layout = VertexLayout::interleaved(&[(0, 3), (1, 3)]);
    /// assert_eq!(layout.stride(), 24);
    /// assert_eq!(layout.attributes()[1].offset, 12);
    /// ```
    pub fn interleaved(attributes: &[(u32, u8)]) -> Self {
        let float = ComponentType::F32.byte_size();
        let stride: u32 = attributes.iter().map(|&(_, n)| u32::from(n) * float).sum();

        let mut offset = 0;
        let attributes = attributes
            .iter()
            .map(|&(index, components)| {
                let attr = VertexAttribute::f32(index, components, stride, offset);
                offset += u32::from(components) * float;
                attr
            })
            .collect();

        Self { attributes }
    }

    /// Appends an attribute.
    pub fn with(mut self, attribute: VertexAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    #[inline]
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Bytes per vertex.
    ///
    /// Taken from the attributes' stride; a zero stride means tightly packed,
    /// in which case it is the widest attribute end. An attribute end past
    /// `u32::MAX` saturates; [`validate`](Self::validate) rejects it.
    pub fn stride(&self) -> u32 {
        self.attributes
            .iter()
            .map(|a| if a.stride == 0 { a.end().unwrap_or(u32::MAX) } else { a.stride })
            .max()
            .unwrap_or(0)
    }

    /// Rejects layouts GL would refuse with `GL_INVALID_VALUE`.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.attributes.is_empty() {
            return Err(GeometryError::InvalidLayout("layout has no attributes".to_string()));
        }

        for (i, a) in self.attributes.iter().enumerate() {
            if !(1..=4).contains(&a.components) {
                return Err(GeometryError::InvalidLayout(format!(
                    "attribute {} has {} components (expected 1..=4)",
                    a.index, a.components
                )));
            }
            let Some(end) = a.end() else {
                return Err(GeometryError::InvalidLayout(format!(
                    "attribute {} offset {} overflows",
                    a.index, a.offset
                )));
            };
            if a.stride > 0 && end > a.stride {
                return Err(GeometryError::InvalidLayout(format!(
                    "attribute {} reads past its {}-byte stride",
                    a.index, a.stride
                )));
            }
            if self.attributes[..i].iter().any(|b| b.index == a.index) {
                return Err(GeometryError::InvalidLayout(format!(
                    "attribute location {} appears twice",
                    a.index
                )));
            }
        }
        Ok(())
    }
}
