//! Text rendering of a placement for terminals and logs.

use crate::models::{Candidate, Resources, ValidationError, evaluate};
use crate::services::optimization::GenerationReport;

/// One `VM i -> PM j` line per VM.
pub fn placement_listing(candidate: &Candidate) -> String {
    candidate
        .genome()
        .iter()
        .enumerate()
        .map(|(vm, pm)| format!("VM {vm} -> PM {pm}\n"))
        .collect()
}

/// VMs hosted by each PM, in VM order.
pub fn hosted_vms(candidate: &Candidate, num_pms: usize) -> Vec<Vec<usize>> {
    let mut hosted = vec![Vec::new(); num_pms];
    for (vm, &pm) in candidate.genome().iter().enumerate() {
        if let Some(slot) = hosted.get_mut(pm) {
            slot.push(vm);
        }
    }
    hosted
}

/// Load against capacity for every PM in use.
///
/// Fails when `candidate` does not fit `resources`.
pub fn host_summary(
    candidate: &Candidate,
    resources: &Resources,
) -> Result<String, ValidationError> {
    let evaluation = evaluate(candidate, resources)?;
    let hosted = hosted_vms(candidate, resources.num_pms());

    Ok(evaluation
        .usage
        .iter()
        .zip(resources.pms())
        .enumerate()
        .filter(|(_, (usage, _))| usage.is_used())
        .map(|(pm, (usage, capacity))| {
            let flag = if usage.exceeds(capacity.cpu_capacity, capacity.ram_capacity) {
                " OVERLOADED"
            } else {
                ""
            };
            format!(
                "PM {pm}: cpu {}/{} ram {}/{} vms [{}]{flag}\n",
                usage.cpu,
                capacity.cpu_capacity,
                usage.ram,
                capacity.ram_capacity,
                join_indices(&hosted[pm]),
            )
        })
        .collect())
}

/// One row per PM, one cell per hosted VM.
pub fn placement_chart(candidate: &Candidate, num_pms: usize) -> String {
    let hosted = hosted_vms(candidate, num_pms);
    let label_width = format!("PM {}", num_pms.saturating_sub(1)).len();
    let cell_width = candidate
        .len()
        .checked_sub(1)
        .map_or(3, |last| format!("VM{last}").len());

    hosted
        .iter()
        .enumerate()
        .map(|(pm, vms)| {
            let cells: String = vms
                .iter()
                .map(|vm| format!(" {:<cell_width$} |", format!("VM{vm}")))
                .collect();
            format!("{:<label_width$} |{cells}\n", format!("PM {pm}"))
        })
        .collect()
}

/// One `Gen n: Fitness = f` line per generation.
pub fn progress(history: &[GenerationReport]) -> String {
    history
        .iter()
        .map(|report| format!("Gen {}: Fitness = {:.4}\n", report.generation, report.best_fitness))
        .collect()
}

fn join_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
