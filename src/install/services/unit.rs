//! Systemd unit for the dashboard process

use super::descriptor::{DescriptorKind, ServiceDescriptor};
use super::template::systemd_quote;
use crate::install::core::InstallationContext;

const UNIT_TEMPLATE: &str = include_str!("../../../templates/creaturebox-web.service.template");

pub const UNIT_NAME: &str = "creaturebox-web.service";

/// Seconds systemd waits before restarting a crashed dashboard.
pub const RESTART_DELAY_SECS: u32 = 10;

pub fn supervisor_unit(ctx: &InstallationContext) -> ServiceDescriptor {
    ServiceDescriptor::new(DescriptorKind::SupervisorUnit, UNIT_NAME, UNIT_TEMPLATE)
        .substitute("target_dir", ctx.target_str())
        .substitute("user", ctx.service_user.clone())
        .substitute("working_dir", systemd_quote(&ctx.web_dir().to_string_lossy()))
        .substitute("port", ctx.service_port.to_string())
        .substitute("interpreter", systemd_quote(&ctx.interpreter().to_string_lossy()))
        .substitute("entry_point", systemd_quote(&ctx.dashboard_entry().to_string_lossy()))
        .substitute("restart_delay", RESTART_DELAY_SECS.to_string())
}
