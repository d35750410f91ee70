use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Resource demand of a single virtual machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vm {
    pub cpu: u64,
    pub ram: u64,
}

/// Resource capacity of a single physical machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pm {
    pub cpu_capacity: u64,
    pub ram_capacity: u64,
}

/// The structural record handed over by a loader before validation.
///
/// Counts are carried separately from the records so that a truncated or padded
/// input can be detected instead of silently trusted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Instance {
    pub num_vms: usize,
    pub num_pms: usize,
    pub vm_records: Vec<(u64, u64)>,
    pub pm_records: Vec<(u64, u64)>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("CountMismatch: declared {declared} {kind} records, got {actual}")]
    CountMismatch {
        kind: &'static str,
        declared: usize,
        actual: usize,
    },
    #[error("ZeroResource: {kind} {index} has a zero {resource} value")]
    ZeroResource {
        kind: &'static str,
        index: usize,
        resource: &'static str,
    },
    #[error("IndexOutOfRange: {kind} index {index} is not below {len}")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },
    #[error("LengthMismatch: candidate has {actual} genes, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

impl ValidationError {
    pub(crate) fn vm_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            kind: "vm",
            index,
            len,
        }
    }

    pub(crate) fn pm_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            kind: "pm",
            index,
            len,
        }
    }
}

/// Read-only resource model shared by every candidate of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resources {
    vms: Vec<Vm>,
    pms: Vec<Pm>,
}

impl Resources {
    #[instrument(level = "debug", skip(vms, pms), fields(num_vms = vms.len(), num_pms = pms.len()))]
    pub fn new(vms: Vec<Vm>, pms: Vec<Pm>) -> Result<Self, ValidationError> {
        for (index, vm) in vms.iter().enumerate() {
            check_positive("vm", index, "cpu", vm.cpu)?;
            check_positive("vm", index, "ram", vm.ram)?;
        }

        for (index, pm) in pms.iter().enumerate() {
            check_positive("pm", index, "cpu", pm.cpu_capacity)?;
            check_positive("pm", index, "ram", pm.ram_capacity)?;
        }

        Ok(Self { vms, pms })
    }

    pub fn num_vms(&self) -> usize {
        self.vms.len()
    }

    pub fn num_pms(&self) -> usize {
        self.pms.len()
    }

    pub fn vms(&self) -> &[Vm] {
        &self.vms
    }

    pub fn pms(&self) -> &[Pm] {
        &self.pms
    }

    /// Returns the `(cpu, ram)` demand of the VM at `vm_index`.
    pub fn demand(&self, vm_index: usize) -> Result<(u64, u64), ValidationError> {
        self.vms
            .get(vm_index)
            .map(|vm| (vm.cpu, vm.ram))
            .ok_or_else(|| ValidationError::vm_out_of_range(vm_index, self.vms.len()))
    }

    /// Returns the `(cpu, ram)` capacity of the PM at `pm_index`.
    pub fn capacity(&self, pm_index: usize) -> Result<(u64, u64), ValidationError> {
        self.pms
            .get(pm_index)
            .map(|pm| (pm.cpu_capacity, pm.ram_capacity))
            .ok_or_else(|| ValidationError::pm_out_of_range(pm_index, self.pms.len()))
    }
}

impl TryFrom<Instance> for Resources {
    type Error = ValidationError;

    fn try_from(instance: Instance) -> Result<Self, Self::Error> {
        check_count("vm", instance.num_vms, instance.vm_records.len())?;
        check_count("pm", instance.num_pms, instance.pm_records.len())?;

        let vms = instance
            .vm_records
            .into_iter()
            .map(|(cpu, ram)| Vm { cpu, ram })
            .collect();
        let pms = instance
            .pm_records
            .into_iter()
            .map(|(cpu_capacity, ram_capacity)| Pm {
                cpu_capacity,
                ram_capacity,
            })
            .collect();

        Self::new(vms, pms)
    }
}

fn check_count(kind: &'static str, declared: usize, actual: usize) -> Result<(), ValidationError> {
    if declared != actual {
        return Err(ValidationError::CountMismatch {
            kind,
            declared,
            actual,
        });
    }

    Ok(())
}

fn check_positive(
    kind: &'static str,
    index: usize,
    resource: &'static str,
    value: u64,
) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::ZeroResource {
            kind,
            index,
            resource,
        });
    }

    Ok(())
}
