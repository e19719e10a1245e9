//! Nginx virtual host that fronts the dashboard on port 80

use super::descriptor::{DescriptorKind, ServiceDescriptor};
use crate::install::core::InstallationContext;

const SITE_TEMPLATE: &str = include_str!("../../../templates/creaturebox.nginx.template");

pub const SITE_NAME: &str = "creaturebox";

/// Upload ceiling for full-resolution photos.
pub const MAX_BODY_SIZE: &str = "50M";

pub fn reverse_proxy_site(ctx: &InstallationContext) -> ServiceDescriptor {
    ServiceDescriptor::new(DescriptorKind::ReverseProxyVhost, SITE_NAME, SITE_TEMPLATE)
        .substitute("host_name", ctx.host_name())
        .substitute("alias", ctx.host_alias.clone())
        .substitute("max_body_size", MAX_BODY_SIZE)
        .substitute("port", ctx.service_port.to_string())
}
