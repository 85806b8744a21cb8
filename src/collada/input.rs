use super::types::Semantic;

// ─── Bindings ─────────────────────────────────────────────────────────────────

/// One `<input>` of a primitive block or of `<vertex_weights>`.
#[derive(Debug, Clone, PartialEq)]
pub struct InputBinding {
    pub semantic: Semantic,
    /// Reference with the leading `#` already stripped.
    pub source_id: String,
    pub offset: usize,
    pub set: Option<u32>,
}

impl InputBinding {
    pub fn new(semantic: Semantic, source_id: impl Into<String>, offset: usize) -> Self {
        Self {
            semantic,
            source_id: source_id.into(),
            offset,
            set: None,
        }
    }
}

/// Offset-less inputs, as found under `<vertices>`, `<joints>` and `<sampler>`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnsharedInputs {
    inputs: Vec<(Semantic, String)>,
}

impl UnsharedInputs {
    pub fn new(inputs: Vec<(Semantic, String)>) -> Self {
        Self { inputs }
    }

    /// Source designated for `semantic`; the first declaration wins.
    pub fn source_for(&self, semantic: &Semantic) -> Option<&str> {
        self.inputs
            .iter()
            .find(|(candidate, _)| candidate == semantic)
            .map(|(_, source)| source.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Semantic, &str)> {
        self.inputs
            .iter()
            .map(|(semantic, source)| (semantic, source.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// The `<vertices>` declaration a `VERTEX` input aliases.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VerticesDecl {
    pub id: String,
    pub inputs: UnsharedInputs,
}

// ─── Binding map ──────────────────────────────────────────────────────────────

/// Where a semantic lives inside one composite index record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedInput<'a> {
    pub offset: usize,
    pub source_id: &'a str,
}

/// Semantic → (source, offset) mapping of one index-stream block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InputBindingMap {
    bindings: Vec<InputBinding>,
    vertices: Option<VerticesDecl>,
}

impl InputBindingMap {
    pub fn new(bindings: Vec<InputBinding>) -> Self {
        Self {
            bindings,
            vertices: None,
        }
    }

    /// Attaches the `<vertices>` declaration used to resolve `VERTEX`.
    pub fn with_vertices(mut self, vertices: Option<VerticesDecl>) -> Self {
        self.vertices = vertices;
        self
    }

    pub fn bindings(&self) -> &[InputBinding] {
        &self.bindings
    }

    pub fn vertices(&self) -> Option<&VerticesDecl> {
        self.vertices.as_ref()
    }

    /// Integers per composite record: `max(offset) + 1`, or 0 with no inputs.
    /// Offsets that no input uses are legal and never read.
    pub fn stride(&self) -> usize {
        self.bindings
            .iter()
            .map(|binding| binding.offset.saturating_add(1))
            .max()
            .unwrap_or(0)
    }

    /// First declared binding for `semantic`.
    pub fn binding(&self, semantic: &Semantic) -> Option<&InputBinding> {
        self.bindings
            .iter()
            .find(|binding| &binding.semantic == semantic)
    }

    pub fn offset_of(&self, semantic: &Semantic) -> Option<usize> {
        self.binding(semantic).map(|binding| binding.offset)
    }

    /// Resolves a semantic to its record offset and backing source.
    ///
    /// `POSITION` goes through the `VERTEX` alias first: the offset is the
    /// `VERTEX` input's and the source is whatever `<vertices>` names as
    /// `POSITION`. Other semantics use their own binding, and fall back to
    /// the `VERTEX` offset when `<vertices>` declares them instead.
    pub fn resolve(&self, semantic: &Semantic) -> Option<ResolvedInput<'_>> {
        if *semantic == Semantic::Position {
            return self
                .resolve_through_vertices(semantic)
                .or_else(|| self.resolve_direct(semantic));
        }

        self.resolve_direct(semantic)
            .or_else(|| self.resolve_through_vertices(semantic))
    }

    fn resolve_direct(&self, semantic: &Semantic) -> Option<ResolvedInput<'_>> {
        self.binding(semantic).map(|binding| ResolvedInput {
            offset: binding.offset,
            source_id: binding.source_id.as_str(),
        })
    }

    fn resolve_through_vertices(&self, semantic: &Semantic) -> Option<ResolvedInput<'_>> {
        let vertex = self.binding(&Semantic::Vertex)?;
        let source_id = self.vertices.as_ref()?.inputs.source_for(semantic)?;
        Some(ResolvedInput {
            offset: vertex.offset,
            source_id,
        })
    }
}
