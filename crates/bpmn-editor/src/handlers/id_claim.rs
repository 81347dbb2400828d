//! `id.updateClaim.claim` / `id.updateClaim.unclaim`: each reverts with the
//! other.

use crate::command::IdClaimContext;
use crate::error::ModelingError;
use crate::modeler::Modeler;

/// # Errors
/// Returns [`ModelingError::IdConflict`] when the id is already claimed.
pub fn claim(modeler: &mut Modeler, ctx: &mut IdClaimContext) -> Result<(), ModelingError> {
    let owner = modeler.moddle.get(ctx.element).id;
    modeler.moddle.ids.claim(ctx.id, owner)?;
    Ok(())
}

pub fn unclaim(modeler: &mut Modeler, ctx: &mut IdClaimContext) -> Result<(), ModelingError> {
    modeler.moddle.ids.unclaim(ctx.id);
    Ok(())
}
