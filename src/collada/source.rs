use super::types::ReferenceMatching;

// ─── Source ───────────────────────────────────────────────────────────────────

/// A named data array from a `<source>` element plus its record stride.
///
/// Built once by the reader and never mutated afterwards. Float and string
/// payloads are both representable; in practice exactly one is filled.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Source {
    id: String,
    name: Option<String>,
    stride: Option<usize>,
    count: usize,
    float_data: Vec<f32>,
    string_data: Vec<String>,
}

impl Source {
    /// Numeric source (`<float_array>`). `stride` is the accessor stride when
    /// one was declared.
    pub fn from_floats(id: impl Into<String>, data: Vec<f32>, stride: Option<usize>) -> Self {
        Self {
            id: id.into(),
            name: None,
            stride: stride.filter(|stride| *stride > 0),
            count: data.len(),
            float_data: data,
            string_data: Vec::new(),
        }
    }

    /// String source (`<Name_array>` / `<IDREF_array>`).
    pub fn from_names(id: impl Into<String>, names: Vec<String>, stride: Option<usize>) -> Self {
        Self {
            id: id.into(),
            name: None,
            stride: stride.filter(|stride| *stride > 0),
            count: names.len(),
            float_data: Vec::new(),
            string_data: names,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Overrides the element count with the array's declared `count`.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Stride from the accessor, if the document declared one.
    pub fn declared_stride(&self) -> Option<usize> {
        self.stride
    }

    /// Declared stride, or 1 (the COLLADA accessor default).
    pub fn stride(&self) -> usize {
        self.stride.unwrap_or(1)
    }

    /// Declared stride, or `default` for the semantic reading this source.
    pub fn stride_or(&self, default: usize) -> usize {
        self.stride.unwrap_or(default)
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn float_data(&self) -> &[f32] {
        &self.float_data
    }

    pub fn string_data(&self) -> &[String] {
        &self.string_data
    }

    /// Number of complete value groups in the float payload.
    pub fn record_count(&self) -> usize {
        self.float_data.len() / self.stride()
    }

    /// `false` when the float payload does not divide evenly into records.
    pub fn is_well_formed(&self) -> bool {
        self.float_data.is_empty() || self.float_data.len() % self.stride() == 0
    }
}

// ─── Source table ─────────────────────────────────────────────────────────────

/// Read-only collection of sources belonging to one mesh, skin or animation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceTable {
    sources: Vec<Source>,
    matching: ReferenceMatching,
}

impl SourceTable {
    pub fn new(sources: Vec<Source>, matching: ReferenceMatching) -> Self {
        Self { sources, matching }
    }

    /// First source, in registration order, whose id matches `reference`.
    pub fn get(&self, reference: &str) -> Option<&Source> {
        self.sources
            .iter()
            .find(|source| reference_matches(reference, source.id(), self.matching))
    }

    /// Float payload of the matching source, verbatim.
    pub fn as_float_slice(&self, reference: &str) -> Option<&[f32]> {
        self.get(reference).map(Source::float_data)
    }

    /// String payload of the matching source, verbatim.
    pub fn as_string_slice(&self, reference: &str) -> Option<&[String]> {
        self.get(reference).map(Source::string_data)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn matching(&self) -> ReferenceMatching {
        self.matching
    }
}

/// Decides whether a reference designates a source id.
///
/// This is the only place the lookup heuristic lives. `Lenient` accepts an
/// exact match, a reference carrying a library prefix in front of the id, or
/// a short reference that is a suffix of a qualified id.
///
/// The last direction is wider than the usual COLLADA loader leniency, which
/// only tolerates a prefix on the reference: `"normals"` also finds
/// `"Cube-mesh-normals"`. Use [`ReferenceMatching::Exact`] to refuse both.
pub fn reference_matches(reference: &str, source_id: &str, matching: ReferenceMatching) -> bool {
    let reference = reference.strip_prefix('#').unwrap_or(reference);
    if reference.is_empty() || source_id.is_empty() {
        return false;
    }

    match matching {
        ReferenceMatching::Exact => reference == source_id,
        ReferenceMatching::Lenient => {
            reference == source_id || reference.ends_with(source_id) || source_id.ends_with(reference)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(matching: ReferenceMatching) -> SourceTable {
        SourceTable::new(
            vec![
                Source::from_floats("Cube-mesh-positions", vec![0.0; 24], Some(3)),
                Source::from_floats("Cube-mesh-normals", vec![0.0; 18], Some(3)),
                Source::from_names("Armature-joints", vec!["Bone1".to_string()], None),
            ],
            matching,
        )
    }

    #[test]
    fn given_exact_reference_when_looking_up_then_source_is_found() {
        let sources = table(ReferenceMatching::Exact);

        let found = sources.get("Cube-mesh-normals").expect("normals source");
        assert_eq!(found.float_data().len(), 18);
        assert!(sources.get("#Cube-mesh-normals").is_some());
        assert!(sources.get("normals").is_none());
    }

    #[test]
    fn given_prefixed_reference_when_lenient_then_suffix_match_wins() {
        let sources = table(ReferenceMatching::Lenient);

        let qualified = sources.get("library/Cube-mesh-positions").expect("qualified");
        assert_eq!(qualified.id(), "Cube-mesh-positions");

        let short = sources.get("normals").expect("short key");
        assert_eq!(short.id(), "Cube-mesh-normals");
    }

    #[test]
    fn given_short_reference_when_matching_then_only_lenient_accepts_the_id_suffix() {
        assert!(reference_matches("#normals", "Cube-mesh-normals", ReferenceMatching::Lenient));
        assert!(!reference_matches("#normals", "Cube-mesh-normals", ReferenceMatching::Exact));
        assert!(!reference_matches("#Cube", "Cube-mesh-normals", ReferenceMatching::Lenient));
    }

    #[test]
    fn given_ambiguous_suffix_when_lenient_then_first_registered_source_wins() {
        let sources = SourceTable::new(
            vec![
                Source::from_floats("a-positions", vec![1.0], None),
                Source::from_floats("b-positions", vec![2.0], None),
            ],
            ReferenceMatching::Lenient,
        );

        assert_eq!(sources.as_float_slice("positions"), Some(&[1.0][..]));
    }

    #[test]
    fn given_absent_source_when_looking_up_then_nothing_is_found() {
        let sources = table(ReferenceMatching::Lenient);

        assert!(sources.get("Cube-mesh-map-0").is_none());
        assert!(sources.as_float_slice("").is_none());
    }

    #[test]
    fn given_undeclared_stride_when_reading_then_defaults_apply() {
        let source = Source::from_floats("uv", vec![0.0; 6], None);

        assert_eq!(source.declared_stride(), None);
        assert_eq!(source.stride(), 1);
        assert_eq!(source.stride_or(2), 2);
        assert!(source.is_well_formed());
    }

    #[test]
    fn given_ragged_payload_when_checking_then_source_is_not_well_formed() {
        let source = Source::from_floats("positions", vec![0.0; 7], Some(3)).with_count(7);

        assert!(!source.is_well_formed());
        assert_eq!(source.record_count(), 2);
        assert_eq!(source.count(), 7);
    }
}
