//! Rules building blocks: turn structure, priority, combat, damage, mana,
//! timing and automatic state checks.
//!
//! Everything here is either pure data or a pure function of
//! [`GameState`](crate::core::GameState). The engine sequences these pieces
//! and performs the mutations they describe.

pub mod cleanup;
pub mod combat;
pub mod damage;
pub mod mana;
pub mod priority;
pub mod timing;
pub mod turn;

pub use cleanup::{check as check_state, CleanupReport, Violation};
pub use combat::{
    attack_candidates, block_options, can_attack, can_block, validate_blocks, AttackingCreature, Block,
    BlockOption, CombatState, DeclarationOutcome, DeclarationRejection,
};
pub use damage::{
    greedy_assignment, lethal_threshold, validate_assignment, AssignmentError, BlockerSlot, DamageAssignment,
    DamageRequest,
};
pub use mana::{available_sources, can_afford, plan_payment, ManaSource, PaymentPlan};
pub use priority::{PassOutcome, PriorityError, PriorityRound};
pub use timing::{
    activated_ability, check_action, check_activate, check_cast, check_play_land, legal_actions, sorcery_window,
};
pub use turn::{turn_steps, Phase, PhaseSpec, Step, TurnContext, TURN_STRUCTURE};
