pub mod behaviors;
pub mod command;
pub mod command_stack;
pub mod config;
pub mod element_factory;
pub mod error;
pub mod handlers;
pub mod interceptor;
pub mod label_util;
pub mod lane_util;
pub mod layout;
pub mod modeler;
pub mod modeling;
pub mod rules;
pub mod updater;

pub use command::{CommandContext, CommandKind, LaneLocation, Placement};
pub use config::ModelerConfig;
pub use element_factory::{ConnectionAttrs, ShapeAttrs};
pub use error::ModelingError;
pub use interceptor::{CommandEvent, CommandInterceptor, Hook, MoveStart};
pub use modeler::Modeler;
pub use modeling::Modeling;
pub use rules::{Allowed, BpmnRules, RuleAction, Rules};

// Re-export the core model so downstream crates don't need a direct dependency
pub use bpmn_core;
