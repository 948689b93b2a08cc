pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod openapi;
pub mod routes;

pub mod ingest {
    pub mod controller;
    pub mod parsing;
    pub mod service;
}

pub mod retrieval {
    pub mod index;
    pub mod search;
}

pub mod llm {
    pub mod anthropic;
    pub mod client;
    pub mod openai;

    pub use client::{build_llm_client, LlmClient, LlmHandle, SharedLlm};
}

pub mod jd {
    pub mod controller;
    pub mod parser;
}

pub mod ats {
    pub mod controller;
    pub mod scoring;
    pub mod skills;
}

pub mod resume {
    pub mod controller;
    pub mod guardrails;
    pub mod headers;
    pub mod patches;
    pub mod repository;
    pub mod state_parser;
    pub mod usecase;

    pub use repository::{ResumeRepository, ResumeRepositoryImpl};
    pub use usecase::{ResumeUseCase, ResumeUseCaseImpl};
}

pub mod generate {
    pub mod controller;
    pub mod inventory;
    pub mod master;
    pub mod rewriter;
    pub mod usecase;

    pub use usecase::{GenerateUseCase, GenerateUseCaseImpl};
}

pub mod export {
    pub mod controller;
    pub mod docx;
}
