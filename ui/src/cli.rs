use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shared::TruthMode;

#[derive(Parser, Debug)]
#[command(name = "resume-ui", author, version, about = "Terminal client for the resume tailoring backend")]
pub struct Cli {
    /// Backend URL; falls back to BACKEND_URL, then http://127.0.0.1:8000
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct JdArg {
    /// Job description file; remembered for later commands
    #[arg(long)]
    pub jd: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ResumeArg {
    /// Resume id; defaults to the last generated or loaded one
    #[arg(long)]
    pub resume_id: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check the backend connection
    Health,
    /// Load an existing resume state and print it
    Load {
        resume_id: String,
    },
    /// Upload resume files (.pdf, .docx, .txt) and rebuild the index
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Rebuild the index from stored resumes
    Reindex,
    /// Parse a job description into structured fields
    ParseJd {
        #[command(flatten)]
        jd: JdArg,
        /// Use the rule-based parser only
        #[arg(long)]
        no_llm: bool,
    },
    /// Generate a tailored resume for a job description
    Generate {
        #[command(flatten)]
        jd: JdArg,
        #[arg(long, default_value_t = 25, value_parser = clap::value_parser!(u64).range(5..=60))]
        top_k: u64,
        #[arg(long)]
        multi_query: bool,
        #[arg(long)]
        parse_with_claude: bool,
        #[arg(long)]
        domain_rewrite: bool,
        #[arg(long, value_parser = ["startup", "enterprise", "regulated", "bigtech"])]
        target_company_type: Option<String>,
        #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u64).range(5..=25))]
        bullets_per_role: u64,
        /// Include the skill audit in the output
        #[arg(long)]
        audit: bool,
        /// Print the retrieved chunks
        #[arg(long)]
        show_chunks: bool,
    },
    /// ATS score of a stored resume (or a pasted resume file) against the JD
    AtsScore {
        #[command(flatten)]
        resume: ResumeArg,
        #[command(flatten)]
        jd: JdArg,
        /// Score this plain-text resume instead of a stored one
        #[arg(long, conflicts_with = "resume_id")]
        resume_file: Option<PathBuf>,
    },
    /// Skills the truth guardrails would block, with remediation hints
    BlockedPlan {
        #[command(flatten)]
        resume: ResumeArg,
        #[command(flatten)]
        jd: JdArg,
        #[arg(long)]
        truth_mode: Option<TruthMode>,
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..=50))]
        top_n: u64,
    },
    /// Confirm a blocked skill with a proof bullet for one role
    SaveOverride {
        #[command(flatten)]
        resume: ResumeArg,
        #[arg(long)]
        skill: String,
        #[arg(long)]
        role_id: String,
        #[arg(long)]
        proof_bullet: String,
        /// Hands-on experience rather than worked-with
        #[arg(long)]
        hands_on: bool,
    },
    /// Suggest patches that close JD gaps
    SuggestPatches {
        #[command(flatten)]
        resume: ResumeArg,
        #[command(flatten)]
        jd: JdArg,
        #[arg(long)]
        truth_mode: Option<TruthMode>,
        /// Match skills loosely
        #[arg(long)]
        no_strict: bool,
    },
    /// Apply the last suggested patches (all, or the given indices)
    ApplyPatches {
        #[command(flatten)]
        resume: ResumeArg,
        indices: Vec<usize>,
        #[arg(long)]
        truth_mode: Option<TruthMode>,
        #[arg(long)]
        export_docx: bool,
    },
    /// Replace one bullet of a role
    EditBullet {
        #[command(flatten)]
        resume: ResumeArg,
        #[arg(long)]
        role_id: String,
        #[arg(long)]
        index: i64,
        #[arg(long)]
        text: String,
        #[arg(long)]
        export_docx: bool,
    },
    /// Save the DOCX and the JD into the exports folder
    Export {
        #[command(flatten)]
        resume: ResumeArg,
        #[command(flatten)]
        jd: JdArg,
        #[arg(long)]
        company: String,
        #[arg(long)]
        position: String,
        #[arg(long)]
        job_id: Option<String>,
    },
}
