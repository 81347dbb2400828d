//! Behaviors: independent command listeners that keep the diagram
//! consistent across commands.
//!
//! Each behavior only registers listeners; none knows about the others.

mod adaptive_label_positioning;
mod attach_support;
mod data_store;
mod group;
mod label_support;
mod lane;
mod subprocess_start_event;
mod unclaim_id;
mod unset_default_flow;

use crate::error::ModelingError;
use crate::interceptor::CommandInterceptor;

/// Register every behavior.
pub fn install(interceptor: &mut CommandInterceptor) -> Result<(), ModelingError> {
    attach_support::install(interceptor)?;
    label_support::install(interceptor)?;
    adaptive_label_positioning::install(interceptor)?;
    lane::install(interceptor)?;
    group::install(interceptor)?;
    data_store::install(interceptor)?;
    subprocess_start_event::install(interceptor)?;
    unclaim_id::install(interceptor)?;
    unset_default_flow::install(interceptor)?;
    log::debug!("behaviors installed");
    Ok(())
}
