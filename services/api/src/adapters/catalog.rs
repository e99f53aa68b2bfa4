//! services/api/src/adapters/catalog.rs
//!
//! An in-memory adapter implementing the `CatalogService` port with the fixed
//! roles, companies, progress and question bank the UI is built around.

use async_trait::async_trait;
use interview_prep_core::{
    domain::{
        CompanySummary, Difficulty, DsaProblem, Eligibility, McqQuestion, ProgressSnapshot,
        RecentAttempt, RoleSummary,
    },
    ports::{CatalogService, PortError, PortResult},
};

/// Serves a static catalog. Cheap to clone; all data is built once in `new`.
#[derive(Clone)]
pub struct MockCatalogAdapter {
    roles: Vec<RoleSummary>,
    companies: Vec<CompanySummary>,
    progress: ProgressSnapshot,
    mcqs: Vec<McqQuestion>,
    dsa: Vec<DsaProblem>,
}

impl Default for MockCatalogAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalogAdapter {
    pub fn new() -> Self {
        Self {
            roles: seed_roles(),
            companies: seed_companies(),
            progress: seed_progress(),
            mcqs: seed_mcqs(),
            dsa: seed_dsa(),
        }
    }
}

#[async_trait]
impl CatalogService for MockCatalogAdapter {
    async fn fetch_roles(&self) -> PortResult<Vec<RoleSummary>> {
        Ok(self.roles.clone())
    }

    async fn fetch_role(&self, id: &str) -> PortResult<RoleSummary> {
        self.roles
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("role {}", id)))
    }

    async fn fetch_companies(&self) -> PortResult<Vec<CompanySummary>> {
        Ok(self.companies.clone())
    }

    async fn fetch_company(&self, id: &str) -> PortResult<CompanySummary> {
        self.companies
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("company {}", id)))
    }

    async fn fetch_progress(&self) -> PortResult<ProgressSnapshot> {
        Ok(self.progress.clone())
    }

    async fn fetch_mcqs(&self) -> PortResult<Vec<McqQuestion>> {
        Ok(self.mcqs.clone())
    }

    async fn fetch_dsa(&self, difficulty: Option<Difficulty>) -> PortResult<Vec<DsaProblem>> {
        Ok(self
            .dsa
            .iter()
            .filter(|p| difficulty.map_or(true, |d| p.difficulty == d))
            .cloned()
            .collect())
    }
}

//=========================================================================================
// Seed Data
//=========================================================================================

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn role(
    id: &str,
    name: &str,
    description: &str,
    difficulty: Difficulty,
    skills: &[&str],
    icon: &str,
) -> RoleSummary {
    RoleSummary {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        difficulty,
        skills: strings(skills),
        icon: icon.to_string(),
    }
}

fn seed_roles() -> Vec<RoleSummary> {
    use Difficulty::*;
    vec![
        role("1", "SDE", "Software Development Engineer", Medium, &["DSA", "System Design", "OOP"], "code"),
        role("2", "Data Analyst", "Analyze and interpret data", Medium, &["SQL", "Python", "Statistics"], "bar-chart"),
        role("3", "DevOps", "Development and Operations", Hard, &["CI/CD", "Docker", "Kubernetes"], "server"),
        role("4", "QA Engineer", "Quality Assurance", Easy, &["Testing", "Automation", "Selenium"], "check-circle"),
        role("5", "ML Engineer", "Machine Learning Engineering", Hard, &["Python", "TensorFlow", "Math"], "brain"),
        role("6", "Frontend Dev", "Frontend Development", Medium, &["React", "CSS", "JavaScript"], "layout"),
    ]
}

#[allow(clippy::too_many_arguments)]
fn company(
    id: &str,
    name: &str,
    logo: &str,
    difficulty: Difficulty,
    rounds: u32,
    roles: &[&str],
    avg_package: &str,
    cgpa: f64,
    branches: &[&str],
) -> CompanySummary {
    CompanySummary {
        id: id.to_string(),
        name: name.to_string(),
        logo: logo.to_string(),
        difficulty,
        rounds,
        roles: strings(roles),
        avg_package: avg_package.to_string(),
        eligibility: Eligibility {
            cgpa,
            branches: branches.iter().map(|b| b.to_string()).collect(),
        },
    }
}

fn seed_companies() -> Vec<CompanySummary> {
    use Difficulty::*;
    vec![
        company("1", "Google", "🔍", Hard, 5, &["SDE", "ML Engineer"], "45 LPA", 8.0, &["CSE", "IT", "ECE"]),
        company("2", "Microsoft", "🪟", Hard, 4, &["SDE", "DevOps"], "42 LPA", 7.5, &["CSE", "IT"]),
        company("3", "Amazon", "📦", Hard, 5, &["SDE", "Data Analyst"], "38 LPA", 7.0, &["CSE", "IT", "ECE", "EE"]),
        company("4", "Flipkart", "🛒", Medium, 4, &["SDE", "QA Engineer"], "28 LPA", 7.0, &["CSE", "IT"]),
        company("5", "Atlassian", "🔷", Hard, 4, &["SDE", "Frontend Dev"], "40 LPA", 8.0, &["CSE"]),
        company("6", "Adobe", "🎨", Medium, 4, &["SDE", "Frontend Dev"], "32 LPA", 7.5, &["CSE", "IT"]),
    ]
}

fn seed_progress() -> ProgressSnapshot {
    let attempt = |id: &str, company: &str, date: &str, score: u8, round: &str| RecentAttempt {
        id: id.to_string(),
        company: company.to_string(),
        date: date.to_string(),
        score,
        round: round.to_string(),
    };
    ProgressSnapshot {
        mcq: 65,
        dsa: 45,
        technical: 30,
        hr: 80,
        overall_score: 55,
        recent_attempts: vec![
            attempt("1", "Google", "2024-01-15", 72, "MCQ"),
            attempt("2", "Microsoft", "2024-01-14", 85, "DSA"),
            attempt("3", "Amazon", "2024-01-13", 60, "Technical"),
        ],
    }
}

fn seed_mcqs() -> Vec<McqQuestion> {
    let mcq = |id: &str, question: &str, options: &[&str], correct: usize, topic: &str| McqQuestion {
        id: id.to_string(),
        question: question.to_string(),
        options: strings(options),
        correct,
        topic: topic.to_string(),
    };
    vec![
        mcq("1", "What is the time complexity of binary search?", &["O(n)", "O(log n)", "O(n²)", "O(1)"], 1, "DSA"),
        mcq("2", "Which data structure uses LIFO?", &["Queue", "Stack", "Array", "LinkedList"], 1, "DSA"),
        mcq("3", "What is polymorphism in OOP?", &["Single inheritance", "Multiple forms", "Encapsulation", "Abstraction"], 1, "OOP"),
    ]
}

fn seed_dsa() -> Vec<DsaProblem> {
    let problem = |id: &str, title: &str, difficulty: Difficulty, topics: &[&str], companies: &[&str]| {
        DsaProblem {
            id: id.to_string(),
            title: title.to_string(),
            difficulty,
            topics: strings(topics),
            companies: strings(companies),
        }
    };
    vec![
        problem("1", "Two Sum", Difficulty::Easy, &["Array", "Hash Map"], &["Google", "Amazon"]),
        problem("2", "LRU Cache", Difficulty::Medium, &["Hash Map", "Linked List"], &["Microsoft", "Facebook"]),
        problem("3", "Median of Two Sorted Arrays", Difficulty::Hard, &["Binary Search", "Array"], &["Google", "Apple"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookups_by_id() {
        let catalog = MockCatalogAdapter::new();
        assert_eq!(catalog.fetch_role("3").await.unwrap().name, "DevOps");
        assert_eq!(catalog.fetch_company("1").await.unwrap().name, "Google");
        assert!(matches!(
            catalog.fetch_company("99").await,
            Err(PortError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn dsa_filter_by_difficulty() {
        let catalog = MockCatalogAdapter::new();
        assert_eq!(catalog.fetch_dsa(None).await.unwrap().len(), 3);
        let hard = catalog.fetch_dsa(Some(Difficulty::Hard)).await.unwrap();
        assert_eq!(hard.len(), 1);
        assert_eq!(hard[0].title, "Median of Two Sorted Arrays");
    }

    #[tokio::test]
    async fn company_helpers() {
        let catalog = MockCatalogAdapter::new();
        let companies = catalog.fetch_companies().await.unwrap();
        let matching: Vec<_> = companies.iter().filter(|c| c.name_matches("SOFT")).collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].name, "Microsoft");

        let frontend = companies.iter().filter(|c| c.hires_for("frontend dev")).count();
        assert_eq!(frontend, 2);
    }
}
