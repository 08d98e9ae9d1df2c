use std::fmt;

/// Which tag family an image tag belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel<'a> {
    /// The immutable tag for a resolved version
    Version(&'a str),
    /// The floating `dev` tag, overwritten on every push
    Dev,
}

impl fmt::Display for Channel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Version(version) => f.write_str(version),
            Channel::Dev => f.write_str("dev"),
        }
    }
}

/// Image tag for a stage: `{repository}:{channel}[-{stage}]`.
///
/// The default stage is the empty string and adds no suffix.
pub fn image_tag(repository: &str, channel: Channel<'_>, stage: &str) -> String {
    if stage.is_empty() {
        format!("{}:{}", repository, channel)
    } else {
        format!("{}:{}-{}", repository, channel, stage)
    }
}
