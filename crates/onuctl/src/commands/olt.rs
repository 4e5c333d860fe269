//! OLT inventory command handlers.

use tabled::Tabled;

use onuctl_core::{Device, ServiceProfile};

use super::Context;
use crate::cli::{OltArgs, OltCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn device_row(d: &Device, color: bool) -> DeviceRow {
    DeviceRow {
        id: d.id.clone(),
        name: d.name.clone(),
        vendor: output::or_dash(d.vendor.as_deref()),
        model: output::or_dash(d.model.as_deref()),
        status: output::status_label(d.status.is_online(), &d.status.to_string(), color),
    }
}

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "Service ID")]
    id: u32,
    #[tabled(rename = "VLAN")]
    vlan: u16,
}

fn service_row(s: &ServiceProfile) -> ServiceRow {
    ServiceRow {
        id: s.id,
        vlan: s.vlan_tag,
    }
}

pub async fn handle(args: OltArgs, ctx: &Context<'_>) -> Result<(), CliError> {
    ctx.resume()?;
    let color = ctx.color();

    let out = match args.command {
        OltCommand::List => {
            let devices = ctx.orchestrator.list_devices().await?;
            output::render_list(
                &ctx.global.output,
                &devices,
                |d| device_row(d, color),
                |d| d.id.clone(),
            )?
        }
        OltCommand::Services { olt } => {
            let services = ctx.orchestrator.list_services(&olt).await?;
            output::render_list(
                &ctx.global.output,
                &services,
                service_row,
                |s| s.vlan_tag.to_string(),
            )?
        }
    };

    output::print_output(&out, ctx.global.quiet);
    Ok(())
}
