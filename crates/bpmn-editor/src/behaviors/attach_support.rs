//! Attachers (boundary events) travel with their host: they join
//! interactive moves, follow moves and resizes, and die with the host.

use bpmn_core::{Delta, ElementIndex};

use crate::command::{
    CommandContext, CommandKind, ConnectionDeleteContext, ShapeDeleteContext, ShapeMoveContext,
    UpdateAttachmentContext,
};
use crate::error::ModelingError;
use crate::handlers::resize_shape::resized_anchor;
use crate::interceptor::{CommandInterceptor, Hook};
use crate::modeler::Modeler;
use crate::rules::{Allowed, RuleAction};

const HIGH_PRIORITY: i32 = 1500;

pub(super) fn install(interceptor: &mut CommandInterceptor) -> Result<(), ModelingError> {
    interceptor.on_move_start(Some(HIGH_PRIORITY), |modeler, event| {
        let hosts = event.shapes.clone();
        for host in hosts {
            for &attacher in &modeler.element(host).attachers {
                if !event.shapes.contains(&attacher) {
                    event.shapes.push(attacher);
                }
            }
        }
        // attachers moving with their host are validated through it
        event.validated_shapes.retain(|shape| {
            modeler
                .element(*shape)
                .host
                .is_none_or(|host| !event.shapes.contains(&host))
        });
    });

    interceptor.on_context(
        CommandKind::ShapeDelete,
        Hook::PreExecute,
        None,
        |modeler, context, _| {
            let CommandContext::ShapeDelete(ctx) = context else {
                return Ok(());
            };
            let attachers = modeler.element(ctx.shape).attachers.to_vec();
            for attacher in attachers {
                if modeler.canvas.contains(attacher) {
                    modeler.execute(ShapeDeleteContext::new(attacher))?;
                }
            }
            Ok(())
        },
    )?;

    interceptor.on_context(
        CommandKind::ElementsMove,
        Hook::PostExecute,
        None,
        |modeler, context, _| {
            let CommandContext::ElementsMove(ctx) = context else {
                return Ok(());
            };
            move_left_behind_attachers(modeler, &ctx.shapes, &ctx.closure.all_shapes, ctx.delta)?;
            if let [shape] = ctx.shapes[..] {
                update_single_attachment(modeler, shape, ctx.new_host)?;
            }
            Ok(())
        },
    )?;

    interceptor.on_context(
        CommandKind::ShapeResize,
        Hook::PostExecute,
        None,
        |modeler, context, _| {
            let CommandContext::ShapeResize(ctx) = context else {
                return Ok(());
            };
            let Some(old_bounds) = ctx.old_bounds else {
                return Ok(());
            };
            if !ctx.hints.attach_support {
                return Ok(());
            }
            let attachers = modeler.element(ctx.shape).attachers.to_vec();
            for attacher in attachers {
                let mid = modeler.element(attacher).bounds.mid();
                let new_mid = resized_anchor(mid, old_bounds, ctx.new_bounds);
                let delta = Delta::new((new_mid.x - mid.x).round(), (new_mid.y - mid.y).round());
                if !delta.is_zero() {
                    move_with_label(modeler, attacher, delta)?;
                }
            }
            Ok(())
        },
    )?;
    Ok(())
}

/// Move attachers of moved hosts that the move closure did not carry.
fn move_left_behind_attachers(
    modeler: &mut Modeler,
    shapes: &[ElementIndex],
    moved: &[ElementIndex],
    delta: Delta,
) -> Result<(), ModelingError> {
    let mut attachers = Vec::new();
    for &shape in shapes {
        for &attacher in &modeler.element(shape).attachers {
            if !moved.contains(&attacher) && !attachers.contains(&attacher) {
                attachers.push(attacher);
            }
        }
    }
    for attacher in attachers {
        move_with_label(modeler, attacher, delta)?;
    }
    Ok(())
}

fn move_with_label(modeler: &mut Modeler, shape: ElementIndex, delta: Delta) -> Result<(), ModelingError> {
    modeler.execute(ShapeMoveContext::new(shape, delta))?;
    if let Some(label) = modeler.element(shape).label {
        modeler.execute(ShapeMoveContext::new(label, delta))?;
    }
    Ok(())
}

/// A single moved shape is attached to the new host (or detached), and
/// loses connections the rules no longer allow.
fn update_single_attachment(
    modeler: &mut Modeler,
    shape: ElementIndex,
    new_host: Option<ElementIndex>,
) -> Result<(), ModelingError> {
    let element = modeler.element(shape);
    if element.is_label() || element.host == new_host {
        return Ok(());
    }
    modeler.execute(UpdateAttachmentContext::new(shape, new_host))?;

    let rules = modeler.rules();
    let element = modeler.element(shape);
    let connections: Vec<ElementIndex> = element
        .incoming
        .iter()
        .chain(&element.outgoing)
        .copied()
        .collect();
    for connection in connections {
        let c = modeler.element(connection);
        let (Some(source), Some(target)) = (c.source, c.target) else {
            continue;
        };
        let action = RuleAction::ConnectionReconnect {
            connection,
            source,
            target,
        };
        if rules.allowed(modeler, &action) == Allowed::Denied && modeler.canvas.contains(connection) {
            modeler.execute(ConnectionDeleteContext::new(connection))?;
        }
    }
    Ok(())
}
