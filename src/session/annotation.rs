use crate::draw::model::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Stable for the annotation's lifetime; assigned when it is pushed.
    pub id: u64,
    pub text: String,
    pub position: Position,
}

impl Annotation {
    pub fn new(text: impl Into<String>, position: Position) -> Self {
        Self {
            id: 0,
            text: text.into(),
            position,
        }
    }

    /// Inline TeX for renderers that typeset math.
    pub fn latex(&self) -> String {
        format!("\\(\\LARGE{{{}}}\\)", self.text)
    }
}

/// Ordered annotations, oldest first, bounded by `capacity`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationList {
    items: Vec<Annotation>,
    capacity: usize,
    next_id: u64,
}

impl AnnotationList {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity: capacity.max(1),
            next_id: 0,
        }
    }

    pub fn push(&mut self, mut annotation: Annotation) {
        annotation.id = self.next_id;
        self.next_id += 1;
        if self.items.len() == self.capacity {
            let dropped = self.items.remove(0);
            tracing::debug!(text = %dropped.text, "annotation limit reached; dropping oldest");
        }
        self.items.push(annotation);
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Annotation> {
        self.items.get_mut(index)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.items
    }
}
