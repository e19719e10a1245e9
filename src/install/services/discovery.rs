//! Avahi advertisement for the dashboard

use super::descriptor::{DescriptorKind, ServiceDescriptor};
use crate::install::core::InstallationContext;

const DISCOVERY_TEMPLATE: &str = include_str!("../../../templates/creaturebox.avahi.template");

pub const DISCOVERY_FILE: &str = "creaturebox.service";

/// Advertised port; nginx listens here, not the dashboard itself.
pub const HTTP_PORT: u16 = 80;

pub fn discovery_advertisement(ctx: &InstallationContext) -> ServiceDescriptor {
    ServiceDescriptor::new(
        DescriptorKind::DiscoveryAdvertisement,
        DISCOVERY_FILE,
        DISCOVERY_TEMPLATE,
    )
    .substitute("http_port", HTTP_PORT.to_string())
    .substitute("host_name", ctx.host_name())
}
