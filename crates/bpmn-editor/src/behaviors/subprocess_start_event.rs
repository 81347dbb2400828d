//! A task replaced by an expanded sub-process gets a start event.

use bpmn_core::{BpmnType, Point};

use crate::command::{CommandContext, CommandKind};
use crate::element_factory::ShapeAttrs;
use crate::error::ModelingError;
use crate::interceptor::{CommandInterceptor, Hook};

pub(super) fn install(interceptor: &mut CommandInterceptor) -> Result<(), ModelingError> {
    interceptor.on_context(
        CommandKind::ShapeReplace,
        Hook::PostExecute,
        None,
        |modeler, context, _| {
            let CommandContext::ShapeReplace(ctx) = context else {
                return Ok(());
            };
            let Some(new_shape) = ctx.new_shape else {
                return Ok(());
            };
            let from_task = modeler.is(ctx.old_shape, |t| {
                t.is_task() || t == BpmnType::CallActivity
            });
            let shape = modeler.element(new_shape);
            if !from_task || shape.collapsed || !modeler.is(new_shape, BpmnType::is_sub_process) {
                return Ok(());
            }
            let b = shape.bounds;
            let position = Point::new(b.x + b.width / 6.0, b.y + b.height / 2.0);
            modeler.modeling().create_shape(
                &ShapeAttrs::new(BpmnType::StartEvent),
                position,
                new_shape,
            )?;
            Ok(())
        },
    )?;
    Ok(())
}
