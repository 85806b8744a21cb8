use super::input::UnsharedInputs;
use super::source::SourceTable;
use super::types::Semantic;

/// `<sampler>`: semantic → source id map (`INPUT`, `OUTPUT`, `INTERPOLATION`, ...).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sampler {
    pub id: String,
    pub inputs: UnsharedInputs,
}

impl Sampler {
    pub fn input(&self, semantic: &Semantic) -> Option<&str> {
        self.inputs.source_for(semantic)
    }
}

/// `<channel>`: binds a sampler to an animated property.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Channel {
    /// Sampler id, `#` stripped.
    pub source: String,
    /// Target path such as `Cube/location.X`.
    pub target: String,
}

impl Channel {
    /// Node id before the first `/`.
    pub fn target_node(&self) -> &str {
        self.target
            .split_once('/')
            .map_or(self.target.as_str(), |(node, _)| node)
    }

    /// Property path after the first `/`, if any.
    pub fn target_address(&self) -> Option<&str> {
        self.target.split_once('/').map(|(_, address)| address)
    }
}

/// Key-frame times and values of one sampler, borrowed from its animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerData<'a> {
    pub input: &'a [f32],
    pub output: &'a [f32],
}

/// `<animation>` with its own sources; nested animations are kept as children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Animation {
    pub id: Option<String>,
    pub name: Option<String>,
    pub sources: SourceTable,
    pub samplers: Vec<Sampler>,
    pub channels: Vec<Channel>,
    pub children: Vec<Animation>,
}

impl Animation {
    pub fn sampler(&self, id: &str) -> Option<&Sampler> {
        let id = id.strip_prefix('#').unwrap_or(id);
        self.samplers.iter().find(|sampler| sampler.id == id)
    }

    /// `INPUT`/`OUTPUT` float data of a sampler, resolved through this
    /// animation's sources. `None` unless both resolve.
    pub fn sampler_data(&self, sampler_id: &str) -> Option<SamplerData<'_>> {
        let sampler = self.sampler(sampler_id)?;
        let input = self.sources.as_float_slice(sampler.input(&Semantic::Input)?)?;
        let output = self.sources.as_float_slice(sampler.input(&Semantic::Output)?)?;
        Some(SamplerData { input, output })
    }

    /// Channels of this animation and every nested one, depth first.
    pub fn all_channels(&self) -> Vec<&Channel> {
        let mut out: Vec<&Channel> = self.channels.iter().collect();
        for child in &self.children {
            out.extend(child.all_channels());
        }
        out
    }
}
