//! ONU command handlers: discovery, registration, search, diagnostics and
//! lifecycle actions.

use serde::Serialize;
use tabled::Tabled;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use onuctl_core::{
    ConflictCheck, CoreError, DeleteAttempt, FetchOutcome, LifecycleAction, OnuCandidate,
    OpticalReading, ProvisionInput, ProvisionReport, RegistrationRequest, ScanOutcome,
    SearchResult, ServiceProfile,
};

use super::{Context, util};
use crate::cli::{OnuArgs, OnuCommand};
use crate::error::CliError;
use crate::output;

// ── Rows and views ───────────────────────────────────────────────────

#[derive(Tabled)]
struct CandidateRow {
    #[tabled(rename = "#")]
    number: String,
    #[tabled(rename = "SN")]
    sn: String,
    #[tabled(rename = "Vendor SN")]
    vendor_sn: String,
    #[tabled(rename = "FSP")]
    fsp: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
}

fn candidate_row(c: &OnuCandidate) -> CandidateRow {
    CandidateRow {
        number: output::or_dash(c.number.as_deref()),
        sn: c.serial_number.clone(),
        vendor_sn: output::or_dash(c.vendor_serial.as_deref()),
        fsp: c.fsp.clone(),
        model: output::or_dash(c.model.as_deref()),
        vendor: output::or_dash(c.vendor_id.as_deref()),
    }
}

/// Search result plus the optical reading taken right after it.
#[derive(Debug, Serialize)]
struct SearchView {
    #[serde(flatten)]
    onu: SearchResult,
    optical: Option<OpticalReading>,
}

fn describe_conflict(conflict: &ConflictCheck) -> String {
    match conflict {
        ConflictCheck::NotRegistered => "none".into(),
        ConflictCheck::LookupFailed { reason } => {
            format!("lookup failed ({reason}), registered anyway")
        }
        ConflictCheck::Removed { stale, delete } => format!(
            "stale registration at {}/{}: {delete}",
            output::or_dash(stale.fsp.as_deref()),
            output::or_dash(stale.ontid.as_deref()),
        ),
    }
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(args: OnuArgs, ctx: &Context<'_>) -> Result<(), CliError> {
    ctx.resume()?;
    let quiet = ctx.global.quiet;

    let out = match args.command {
        OnuCommand::Autofind { olt } => autofind(&olt, ctx).await?,

        OnuCommand::Register {
            olt,
            sn,
            fsp,
            service,
            service_id,
            description,
            native_vlan,
        } => {
            let input = ProvisionInput {
                candidate: OnuCandidate::manual(sn, fsp),
                description,
                service: None,
                native_vlan,
            };
            let service = pick_service(&olt, service, service_id, &input, ctx).await?;
            let input = ProvisionInput {
                service: Some(service),
                ..input
            };
            let report = provision(&olt, input, ctx).await?;
            render_report(&report, ctx)?
        }

        OnuCommand::Search {
            olt,
            sn,
            no_optical,
        } => search(&olt, &sn, no_optical, ctx).await?,

        OnuCommand::Optical { olt, fsp, ontid } => {
            let reading = match ctx
                .orchestrator
                .fetch_optical(&olt, Some(&fsp), Some(&ontid))
                .await?
            {
                FetchOutcome::Reading(reading) => reading,
                FetchOutcome::Skipped => {
                    return Err(CliError::validation("fsp/ontid", "both are required"));
                }
                FetchOutcome::Superseded => {
                    return Err(CliError::Config {
                        message: "optical reading was superseded".into(),
                    });
                }
            };
            output::render_single(
                &ctx.global.output,
                &reading,
                |r| {
                    output::detail(&[
                        ("FSP", r.target.fsp.clone()),
                        ("ONT ID", r.target.ontid.clone()),
                        ("ONU RX", output::dbm(r.onu_rx)),
                        ("OLT RX", output::dbm(r.olt_rx)),
                    ])
                },
                |r| format!("{} {}", output::dbm(r.onu_rx), output::dbm(r.olt_rx)),
            )?
        }

        OnuCommand::Delete { olt, sn } => {
            let prompt = format!("Delete ONU {sn} from OLT {olt}?");
            let done = format!("Deleted ONU {sn} from OLT {olt}");
            let action = LifecycleAction::Delete { sn };
            if run_action(&olt, action, &prompt, ctx).await? {
                output::notice(&done, quiet);
            }
            String::new()
        }

        OnuCommand::Reboot { olt, fsp, ontid } => {
            let prompt = format!("Reboot ONU {fsp} #{ontid} on OLT {olt}?");
            let done = format!("Reboot sent to ONU {fsp} #{ontid}");
            let action = LifecycleAction::Reboot { fsp, ontid };
            if run_action(&olt, action, &prompt, ctx).await? {
                output::notice(&done, quiet);
            }
            String::new()
        }
    };

    output::print_output(&out, quiet);
    Ok(())
}

// ── Discovery ────────────────────────────────────────────────────────

async fn autofind(olt: &str, ctx: &Context<'_>) -> Result<String, CliError> {
    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let message = format!("Scanning OLT {olt} for unregistered ONUs");
    let bar = util::spinner(&message, ctx.global.quiet);
    let result = ctx.orchestrator.auto_find(olt, &cancel).await;
    bar.finish_and_clear();
    interrupt.abort();

    let outcome = result?;
    if matches!(outcome, ScanOutcome::Empty) {
        output::notice("No unregistered ONUs found", ctx.global.quiet);
    }
    output::render_list(
        &ctx.global.output,
        outcome.candidates(),
        candidate_row,
        |c| c.serial_number.clone(),
    )
}

// ── Registration ─────────────────────────────────────────────────────

/// Resolve `--service` against the OLT's service list, matching the VLAN
/// tag unless `--service-id` was given.
async fn pick_service(
    olt: &str,
    wanted: u32,
    by_id: bool,
    input: &ProvisionInput,
    ctx: &Context<'_>,
) -> Result<ServiceProfile, CliError> {
    // Check everything except the service before touching the network.
    let placeholder = ServiceProfile {
        id: wanted,
        vlan_tag: 0,
    };
    RegistrationRequest::build(&ProvisionInput {
        service: Some(placeholder),
        ..input.clone()
    })?;

    let services = ctx.orchestrator.list_services(olt).await?;
    services
        .into_iter()
        .find(|s| {
            if by_id {
                s.id == wanted
            } else {
                u32::from(s.vlan_tag) == wanted
            }
        })
        .ok_or_else(|| CliError::NotFound {
            resource_type: if by_id { "service" } else { "service VLAN" }.into(),
            identifier: wanted.to_string(),
            list_command: format!("olt services {olt}"),
        })
}

async fn provision(
    olt: &str,
    input: ProvisionInput,
    ctx: &Context<'_>,
) -> Result<ProvisionReport, CliError> {
    let bar = util::spinner(
        &format!("Registering {} on OLT {olt}", input.candidate.serial_number),
        ctx.global.quiet,
    );
    let result = ctx.orchestrator.provision(olt, input).await;
    bar.finish_and_clear();
    let report = result?;

    if let ConflictCheck::Removed {
        delete: DeleteAttempt::Failed { reason },
        ..
    } = &report.conflict
    {
        warn!(sn = %report.request.serial_number, %reason, "stale registration was not removed");
    }
    Ok(report)
}

fn render_report(report: &ProvisionReport, ctx: &Context<'_>) -> Result<String, CliError> {
    output::render_single(
        &ctx.global.output,
        report,
        |r| {
            output::detail(&[
                ("SN", r.request.serial_number.clone()),
                ("OLT", r.device_id.clone()),
                ("FSP", r.request.fsp.to_string()),
                ("ONT ID", output::or_dash(r.onu.ontid.as_deref())),
                ("Description", r.request.description.clone()),
                (
                    "Service",
                    format!("{} (VLAN {})", r.request.service.id, r.request.service.vlan_tag),
                ),
                ("Native VLAN", r.request.native_vlan.to_string()),
                ("Conflict", describe_conflict(&r.conflict)),
                ("Attempt", r.attempt_id.to_string()),
            ])
        },
        |r| output::or_dash(r.onu.ontid.as_deref()),
    )
}

// ── Search & diagnostics ─────────────────────────────────────────────

async fn search(
    olt: &str,
    sn: &str,
    no_optical: bool,
    ctx: &Context<'_>,
) -> Result<String, CliError> {
    let onu = ctx
        .orchestrator
        .search(olt, sn)
        .await?
        .ok_or_else(|| CliError::NotFound {
            resource_type: "ONU".into(),
            identifier: sn.trim().to_owned(),
            list_command: format!("onu autofind {olt}"),
        })?;

    let optical = if no_optical || !onu.status.is_online() {
        None
    } else {
        match ctx
            .orchestrator
            .fetch_optical(olt, onu.fsp.as_deref(), onu.ontid.as_deref())
            .await
        {
            Ok(FetchOutcome::Reading(reading)) => Some(reading),
            Ok(FetchOutcome::Skipped | FetchOutcome::Superseded) => None,
            Err(CoreError::AuthExpired) => return Err(CliError::SessionExpired),
            Err(err) => {
                warn!(error = %err, "optical reading unavailable");
                None
            }
        }
    };

    let color = ctx.color();
    let view = SearchView { onu, optical };
    output::render_single(
        &ctx.global.output,
        &view,
        |v| {
            let mut pairs = vec![
                ("SN", output::or_dash(v.onu.serial_number.as_deref())),
                (
                    "Status",
                    output::status_label(v.onu.status.is_online(), &v.onu.status.to_string(), color),
                ),
                ("Description", output::or_dash(v.onu.description.as_deref())),
                ("FSP", output::or_dash(v.onu.fsp.as_deref())),
                ("ONT ID", output::or_dash(v.onu.ontid.as_deref())),
                ("Vendor SN", output::or_dash(v.onu.vendor_serial.as_deref())),
                ("Line profile", output::or_dash(v.onu.line_profile.as_deref())),
            ];
            if let Some(ref reading) = v.optical {
                pairs.push(("ONU RX", output::dbm(reading.onu_rx)));
                pairs.push(("OLT RX", output::dbm(reading.olt_rx)));
            }
            output::detail(&pairs)
        },
        |v| v.onu.status.to_string(),
    )
}

// ── Lifecycle ────────────────────────────────────────────────────────

/// Stage, confirm, then dispatch a destructive action. Returns `false` when
/// the operator declined.
async fn run_action(
    olt: &str,
    action: LifecycleAction,
    prompt: &str,
    ctx: &Context<'_>,
) -> Result<bool, CliError> {
    let label = format!("onu {}", action.op());
    let pending = ctx.orchestrator.lifecycle().stage(olt, action);

    let confirmed = util::confirm(prompt, &label, ctx.global.yes);
    if !matches!(confirmed, Ok(true)) {
        pending.cancel();
        confirmed?;
        output::notice("Cancelled", ctx.global.quiet);
        return Ok(false);
    }

    let bar = util::spinner(&format!("Running {label}"), ctx.global.quiet);
    let result = ctx.orchestrator.confirm(pending).await;
    bar.finish_and_clear();
    result?;
    Ok(true)
}
