use serde::{Deserialize, Serialize};

const GENERAL_GUIDANCE: &str = "General Career Guidance Recommended";

/// Inclusive score range mapped to a recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRule {
    pub min_score: i64,
    pub max_score: i64,
    pub recommendation: String,
}

impl RecommendationRule {
    pub fn new(min_score: i64, max_score: i64, recommendation: impl Into<String>) -> Self {
        Self {
            min_score,
            max_score,
            recommendation: recommendation.into(),
        }
    }

    pub fn contains(&self, score: i64) -> bool {
        self.min_score <= score && score <= self.max_score
    }
}

/// First rule whose range contains `score`, or `fallback` when none does.
///
/// Ranges may overlap or leave gaps; list order decides overlaps.
pub fn recommend<'a>(rules: &'a [RecommendationRule], fallback: &'a str, score: u8) -> &'a str {
    rules
        .iter()
        .find(|rule| rule.contains(i64::from(score)))
        .map(|rule| rule.recommendation.as_str())
        .unwrap_or(fallback)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationMapper {
    rules: Vec<RecommendationRule>,
    fallback: String,
}

impl RecommendationMapper {
    pub fn new(rules: Vec<RecommendationRule>, fallback: impl Into<String>) -> Self {
        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    pub fn rules(&self) -> &[RecommendationRule] {
        &self.rules
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn recommend(&self, score: u8) -> &str {
        recommend(&self.rules, &self.fallback, score)
    }
}

/// Career paths suggested for an assessment slug at a given normalized score.
pub fn career_suggestions(slug: &str, score: u8) -> Vec<String> {
    let base: &[&str] = match slug {
        "career-aptitude" => &[
            "Software Engineer",
            "Data Analyst",
            "Project Manager",
            "Business Analyst",
        ],
        "interest-profiler" => &[
            "Healthcare Professional",
            "Environmental Scientist",
            "Creative Director",
            "Social Worker",
        ],
        "personality-assessment" => &[
            "Research Scientist",
            "Counselor",
            "Marketing Manager",
            "Financial Advisor",
        ],
        _ => &[GENERAL_GUIDANCE],
    };
    let lead = base[0];

    if score >= 80 {
        std::iter::once(format!("Leadership roles in {lead}"))
            .chain(base.iter().map(|career| career.to_string()))
            .collect()
    } else if score >= 60 {
        base.iter().map(|career| career.to_string()).collect()
    } else {
        vec![
            format!("Entry-level positions in {lead}"),
            "Training programs recommended".to_string(),
        ]
    }
}

/// Dashboard label for a normalized score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Self::Excellent,
            60..=79 => Self::Good,
            40..=59 => Self::Average,
            _ => Self::NeedsImprovement,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiers() -> Vec<RecommendationRule> {
        vec![
            RecommendationRule::new(0, 10, "R1"),
            RecommendationRule::new(11, 20, "R2"),
        ]
    }

    #[test]
    fn picks_containing_range_and_falls_back_on_gaps() {
        let mapper = RecommendationMapper::new(tiers(), "R0");

        assert_eq!(mapper.recommend(0), "R1");
        assert_eq!(mapper.recommend(10), "R1");
        assert_eq!(mapper.recommend(11), "R2");
        assert_eq!(mapper.recommend(15), "R2");
        assert_eq!(mapper.recommend(25), "R0");
    }

    #[test]
    fn first_listed_rule_wins_on_overlap() {
        let rules = vec![
            RecommendationRule::new(50, 100, "broad"),
            RecommendationRule::new(70, 80, "narrow"),
        ];
        assert_eq!(recommend(&rules, "none", 75), "broad");
    }

    #[test]
    fn no_rules_always_falls_back() {
        assert_eq!(recommend(&[], "fallback", 42), "fallback");
    }

    #[test]
    fn inverted_range_never_matches() {
        let rules = vec![RecommendationRule::new(20, 10, "never")];
        assert_eq!(recommend(&rules, "fallback", 15), "fallback");
    }

    #[test]
    fn career_suggestions_follow_score_tiers() {
        let high = career_suggestions("career-aptitude", 85);
        assert_eq!(high[0], "Leadership roles in Software Engineer");
        assert_eq!(high.len(), 5);

        let mid = career_suggestions("interest-profiler", 60);
        assert_eq!(mid[0], "Healthcare Professional");
        assert_eq!(mid.len(), 4);

        let low = career_suggestions("personality-assessment", 59);
        assert_eq!(
            low,
            vec![
                "Entry-level positions in Research Scientist".to_string(),
                "Training programs recommended".to_string(),
            ]
        );

        let unknown = career_suggestions("sample-assessment", 90);
        assert_eq!(
            unknown,
            vec![
                "Leadership roles in General Career Guidance Recommended".to_string(),
                "General Career Guidance Recommended".to_string(),
            ]
        );
    }

    #[test]
    fn score_bands_match_dashboard_thresholds() {
        assert_eq!(ScoreBand::from_score(100), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_score(80), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_score(79).label(), "Good");
        assert_eq!(ScoreBand::from_score(40), ScoreBand::Average);
        assert_eq!(ScoreBand::from_score(39).label(), "Needs Improvement");
    }
}
