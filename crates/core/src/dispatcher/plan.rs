//! Turning discovered files into tasks.

use tracing::debug;

use super::types::{CopyJob, JobFailure, Task};
use crate::converter::ConversionJob;
use crate::discovery::Discovery;
use crate::encoding::EncodingOptions;
use crate::layout::OutputLayout;

/// Tasks to dispatch plus inputs that could not be placed.
#[derive(Debug, Default)]
pub struct Plan {
    pub tasks: Vec<Task>,
    pub rejected: Vec<JobFailure>,
}

impl Plan {
    pub fn conversions(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| matches!(t, Task::Convert(_)))
            .count()
    }
}

/// Builds one conversion per discovered file and one copy per companion.
///
/// Discovery errors and layout errors end up in `rejected`.
pub fn plan_tasks(discovery: Discovery, layout: &OutputLayout, options: &EncodingOptions) -> Plan {
    let mut plan = Plan::default();

    for error in discovery.errors {
        plan.rejected.push(JobFailure::new(error.path(), &error));
    }

    for input in discovery.files {
        match layout.output_for(input.path()) {
            Ok(output) => {
                debug!("Planned {:?} -> {:?}", input.path(), output);
                plan.tasks
                    .push(Task::Convert(ConversionJob::new(input, output, options.clone())));
            }
            Err(e) => plan.rejected.push(JobFailure::new(input.path(), e)),
        }
    }

    for source in discovery.companions {
        match layout.companion_for(&source) {
            Ok(Some(target)) => plan.tasks.push(Task::Copy(CopyJob {
                source,
                target,
                overwrite: options.overwrite(),
            })),
            Ok(None) => {}
            Err(e) => plan.rejected.push(JobFailure::new(source, e)),
        }
    }

    plan
}
