//! Host service descriptors: supervisor unit, reverse proxy, discovery
//!
//! Each descriptor is rendered from a compiled-in template and handed to the
//! [`ProvisioningBackend`], which installs and activates it.

mod descriptor;
mod discovery;
mod hosts;
mod site;
mod template;
mod unit;

pub use descriptor::{DescriptorKind, RenderedDescriptor, ServiceDescriptor};
pub use discovery::{DISCOVERY_FILE, discovery_advertisement};
pub use hosts::{LOOPBACK, entry_suffix, has_entry};
pub use site::{SITE_NAME, reverse_proxy_site};
pub use template::{render, systemd_quote};
pub use unit::{RESTART_DELAY_SECS, UNIT_NAME, supervisor_unit};

use log::debug;

use super::backend::ProvisioningBackend;
use super::core::{InstallError, InstallLog, InstallationContext};

/// The three descriptors in activation order.
pub fn descriptors(ctx: &InstallationContext) -> [ServiceDescriptor; 3] {
    [
        supervisor_unit(ctx),
        reverse_proxy_site(ctx),
        discovery_advertisement(ctx),
    ]
}

/// Render every descriptor, then install and activate them in order.
///
/// All three are rendered before anything touches the host, so a template
/// problem never leaves a half-configured set of services behind.
pub fn generate(
    ctx: &InstallationContext,
    backend: &dyn ProvisioningBackend,
    log: &mut InstallLog,
) -> Result<(), InstallError> {
    let rendered = descriptors(ctx)
        .iter()
        .map(ServiceDescriptor::render)
        .collect::<Result<Vec<_>, _>>()?;

    for descriptor in &rendered {
        debug!("Installing {} {}", descriptor.kind, descriptor.file_name);
        let installed = match descriptor.kind {
            DescriptorKind::SupervisorUnit => backend.install_and_activate_unit(descriptor)?,
            DescriptorKind::ReverseProxyVhost => backend.install_and_reload_site(descriptor)?,
            DescriptorKind::DiscoveryAdvertisement => {
                backend.install_and_restart_discovery(descriptor)?
            }
        };
        log.info(format!("Installed {} {}", descriptor.kind, installed.display()));
    }

    let host_name = ctx.host_name();
    if backend.ensure_hosts_entry(LOOPBACK, &host_name)? {
        log.info(format!("Mapped {host_name} to {LOOPBACK} in the hosts file"));
    } else {
        log.info(format!("Hosts file already maps {host_name}"));
    }

    log.info(format!(
        "Dashboard service listening on port {}, published as http://{host_name}/",
        ctx.service_port
    ));
    Ok(())
}
