//! Service descriptors handed to the host's service managers

use std::collections::BTreeMap;
use std::fmt;

use super::template;
use crate::install::core::InstallError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DescriptorKind {
    SupervisorUnit,
    ReverseProxyVhost,
    DiscoveryAdvertisement,
}

impl DescriptorKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::SupervisorUnit => "systemd unit",
            Self::ReverseProxyVhost => "nginx site",
            Self::DiscoveryAdvertisement => "avahi service",
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Template plus the values to substitute into it.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub kind: DescriptorKind,
    pub file_name: String,
    template: &'static str,
    substitutions: BTreeMap<&'static str, String>,
}

impl ServiceDescriptor {
    pub fn new(kind: DescriptorKind, file_name: impl Into<String>, template: &'static str) -> Self {
        Self {
            kind,
            file_name: file_name.into(),
            template,
            substitutions: BTreeMap::new(),
        }
    }

    pub fn substitute(mut self, placeholder: &'static str, value: impl Into<String>) -> Self {
        self.substitutions.insert(placeholder, value.into());
        self
    }

    pub fn substitutions(&self) -> &BTreeMap<&'static str, String> {
        &self.substitutions
    }

    pub fn render(&self) -> Result<RenderedDescriptor, InstallError> {
        let contents =
            template::render(self.template, &self.substitutions).map_err(|reason| {
                InstallError::service(self.kind, format!("{}: {reason}", self.file_name))
            })?;
        Ok(RenderedDescriptor {
            kind: self.kind,
            file_name: self.file_name.clone(),
            contents,
        })
    }
}

/// Final file contents, ready to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDescriptor {
    pub kind: DescriptorKind,
    pub file_name: String,
    pub contents: String,
}
