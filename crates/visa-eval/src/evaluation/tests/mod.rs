mod academic;
mod common;
mod orchestrator;
mod rules;
mod workflow;
