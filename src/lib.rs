//! Topic Dialog - resumable multi-turn conversation topics
//!
//! A conversation is a tree of topics. Each incoming message is handed to the
//! root, which delegates down to at most one active child per level. Every
//! topic's state is plain serializable data, rehydrated at the start of a turn
//! and persisted at the end of it.

pub mod config;
pub mod db;
pub mod demo;
pub mod parent;
pub mod prompt;
pub mod runtime;
pub mod topic;
pub mod validator;

pub use parent::{Child, ChildTopics, Decision, ParentLogic, ParentTopic, ParentTopicState, Resume};
pub use prompt::{Prompt, PromptConfig, PromptState, PromptStatus, Renderer};
pub use runtime::{ConversationRuntime, RootFactory, StateStore};
pub use topic::{FailureReason, Topic, TopicError, Turn, TurnContext, TurnOutcome};
pub use validator::{ValidationResult, Validator};
