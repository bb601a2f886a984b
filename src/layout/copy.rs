//! Fixed document copy. Values may carry `<b>` markup.

pub const GREETING_PREFIX: &str = "Hi ";

pub const INTRO: &str = "Our Senior Data Scientist <b>Mr. Subramani</b>, has shared with you the \
prescription based on your recent consultation to join our <b>Nationwide Data Analytics \
Training and Placement Program 2025</b>.";

pub const ABOUT_US_HEADING: &str = "About Us";

pub const ABOUT_US: &str = "At <b>Analytics Avenue and Advanced Analytics</b>, we are a team of \
<b>Data Scientists, Data Engineers, and BI Developers</b> throughout India across various MNCs \
joined together to keep a pause for unemployment and empowered <b>500+ professionals</b> in the \
past year, enabling them to transition into various <b>Data Analytics roles</b>.";

pub const INSTRUCTION: &str = "<b>Below you can find the career road map, Key outcomes & \
suggestions given by our Data Scientist</b>";

pub const TECHNOLOGIES: &str = "SQL, Python, Statistics, Power BI, Machine Learning, Gen AI";

pub const LABEL_NAME: &str = "Name";
pub const LABEL_STATUS: &str = "Status";
pub const LABEL_TECHNOLOGIES: &str = "Technologies Needed";
pub const LABEL_SECTORS: &str = "Sectors Covered";

pub const ROADMAP_HEADING: &str = "Career Roadmap";

pub const ROADMAP_STEPS: [&str; 3] = [
    "Step 1 \u{2013} Learn Tools (SQL, Python, Statistics, Power BI, Machine Learning, Gen AI)",
    "Step 2 \u{2013} Domain-Specific Projects",
    "Step 3 \u{2013} Role Readiness (interviews, placement support)",
];

pub const OUTCOMES_HEADING: &str = "Key Outcomes";

/// Fixed outcomes that precede and follow the domain-knowledge line.
pub const OUTCOMES_BEFORE_DOMAINS: [&str; 3] = [
    "Data Analysis Skills (SQL, Python, Visualization, Statistics)",
    "Data Engineer Skills (Cloud, SQL, Python, Data Warehousing, ETL orchestration)",
    "Machine Learning & Gen AI (LLMs, Prompt Engineering, RAG Pipelines, Embeddings, Vector \
     Databases, Fine-Tuning & Deployment)",
];

pub const OUTCOMES_AFTER_DOMAINS: [&str; 2] = [
    "Recreate Industrial Standard projects worked by our Data Scientists",
    "Placement opportunities, Organic job calls and referral drives",
];

pub fn domain_knowledge_outcome(domains_title: &str) -> String {
    format!("Domain Knowledge ({} etc.)", domains_title)
}

pub const PRESCRIPTION_HEADING: &str = "Prescription:";

pub const BULLET_PREFIX: &str = "\u{2022} ";

pub const SERVICES_HEADING: &str = "Our Customized Services for you:";
pub const SERVICES_HEADER: [&str; 2] = ["Service", "Details"];

pub fn services_rows(domains_title: &str) -> Vec<(&'static str, String)> {
    vec![
        (
            "1. Industry-Relevant Projects",
            format!(
                "Work on 3 projects across {}, focusing on data modeling, EDA, Machine Learning, \
                 and GenAI for forecasting, cost optimization, anomaly detection, and decision \
                 support.",
                domains_title
            ),
        ),
        (
            "2. Secret Job Portals Access",
            "Setup and optimize your profile on 9 exclusive job portals to help you receive \
             organic job calls"
                .to_string(),
        ),
        (
            "3. Interview Preparation Materials",
            "Lifetime access to interview notes, preparation guides, and materials prepared by \
             top Data Scientists in real interview scenarios"
                .to_string(),
        ),
        (
            "4. Monthly In-Person Training",
            "Attend monthly in-house classroom sessions (1 weekend per month) for revision, rapid \
             preparation, and mentorship from experienced professionals"
                .to_string(),
        ),
    ]
}

pub fn career_table_heading(domains_title: &str) -> String {
    format!("{} \u{2013} Career Prescription Table", domains_title)
}

pub const CAREER_HEADER: [&str; 5] = [
    "Domain",
    "Role",
    "Exciting Challenge",
    "Key Technical Skills",
    "Targeted Companies",
];

pub const REVEAL_TEXT: &str = "Actual projects will be revealed during placement training";

pub const HEADER_MISSING: &str = "ERROR: header image not found!";
