//! Filter engine: decides which fetched entities are worth looking at.
//!
//! Predicates run in a fixed order and the first failing one excludes:
//! availability threshold, blacklist, participant exclusion, then (classes
//! only) course whitelist and coach filter. Every text comparison is
//! case-insensitive. Blank terms in a list are ignored.

use courtwatch_core::config::{ClassFilter, TournamentFilter};
use courtwatch_core::types::{Class, Entity, Tournament};

/// Kind-specific inclusion test against that kind's rule.
pub trait Matches: Entity {
    fn matches(&self, rule: &Self::Rule) -> bool;
}

/// Keep the entities that pass `rule`, preserving input order.
pub fn apply<E: Matches>(entities: Vec<E>, rule: &E::Rule) -> Vec<E> {
    entities.into_iter().filter(|e| e.matches(rule)).collect()
}

impl Matches for Tournament {
    fn matches(&self, rule: &TournamentFilter) -> bool {
        if below_threshold(self.available_slots(), rule.min_available_places) {
            return false;
        }
        if contains_any(self.display_name(), &rule.blacklist) {
            return false;
        }
        // Tournaments match the player's full name exactly.
        if let Some(player) = configured(rule.player_name.as_deref()) {
            let player = player.to_lowercase();
            if self.participant_names().any(|name| name.to_lowercase() == player) {
                return false;
            }
        }
        true
    }
}

impl Matches for Class {
    fn matches(&self, rule: &ClassFilter) -> bool {
        if below_threshold(self.available_slots(), rule.min_available_places) {
            return false;
        }
        if contains_any(self.display_name(), &rule.blacklist) {
            return false;
        }
        // Classes match the player name as a substring of a registrant.
        if let Some(player) = configured(rule.player_name.as_deref()) {
            let player = player.to_lowercase();
            if self.registrant_names().any(|name| name.to_lowercase().contains(&player)) {
                return false;
            }
        }
        if has_terms(&rule.course_names) {
            match self.course_name() {
                Some(course) if contains_any(course, &rule.course_names) => {}
                _ => return false,
            }
        }
        if has_terms(&rule.coach_names)
            && !self.coach_names().any(|coach| contains_any(coach, &rule.coach_names))
        {
            return false;
        }
        true
    }
}

fn below_threshold(available: u32, min: u32) -> bool {
    min > 0 && available < min
}

fn configured(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn has_terms(terms: &[String]) -> bool {
    terms.iter().any(|t| !t.trim().is_empty())
}

/// True when any non-blank term is a case-insensitive substring of `text`.
fn contains_any(text: &str, terms: &[String]) -> bool {
    let text = text.to_lowercase();
    terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .any(|t| text.contains(&t.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtwatch_core::types::{Coach, CourseSummary, Player, Registration, RegistrationInfo, Team};

    fn tournament(id: &str, name: &str, places: i32) -> Tournament {
        Tournament {
            tournament_id: id.into(),
            name: name.into(),
            available_places: places,
            status: "PENDING".into(),
            ..Default::default()
        }
    }

    fn with_players(mut t: Tournament, names: &[&str]) -> Tournament {
        t.teams = vec![Team {
            team_id: "team".into(),
            players: names.iter().map(|n| Player { user_id: String::new(), name: n.to_string() }).collect(),
        }];
        t
    }

    fn class(id: &str, course: Option<&str>, max_players: i32, registrants: &[&str], coaches: &[&str]) -> Class {
        Class {
            academy_class_id: id.into(),
            course_summary: course.map(|name| CourseSummary {
                name: name.into(),
                max_players,
                ..Default::default()
            }),
            registration_info: RegistrationInfo {
                registrations: registrants
                    .iter()
                    .map(|n| Registration {
                        registration_id: String::new(),
                        player: Player { user_id: String::new(), name: n.to_string() },
                    })
                    .collect(),
            },
            coaches: coaches.iter().map(|n| Coach { coach_id: String::new(), name: n.to_string() }).collect(),
            ..Default::default()
        }
    }

    fn ids<E: Entity>(entities: &[E]) -> Vec<&str> {
        entities.iter().map(|e| e.id()).collect()
    }

    fn terms(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_blacklist_keeps_order() {
        let tournaments = vec![
            tournament("1", "Open Padel Mix", 4),
            tournament("2", "Ladies Only Cup", 2),
            tournament("3", "Torneo Femenino", 3),
            tournament("4", "Summer Championship", 1),
        ];
        let rule = TournamentFilter {
            tenant_id: "t1".into(),
            blacklist: terms(&["ladies", "femenino"]),
            ..Default::default()
        };
        assert_eq!(ids(&apply(tournaments, &rule)), vec!["1", "4"]);
    }

    #[test]
    fn test_blacklist_case_insensitive() {
        let rule = TournamentFilter { blacklist: terms(&["LaDiEs"]), ..Default::default() };
        assert!(!tournament("1", "LADIES Tournament", 2).matches(&rule));
    }

    #[test]
    fn test_min_available_places() {
        let tournaments = vec![
            tournament("1", "A", 0),
            tournament("2", "B", 1),
            tournament("3", "C", 5),
        ];
        let rule = TournamentFilter { min_available_places: 2, ..Default::default() };
        assert_eq!(ids(&apply(tournaments, &rule)), vec!["3"]);
    }

    #[test]
    fn test_empty_rule_matches_everything() {
        let tournaments = vec![tournament("1", "A", 2), tournament("2", "B", 0)];
        assert_eq!(apply(tournaments, &TournamentFilter::default()).len(), 2);

        let classes = vec![class("c1", None, 0, &[], &[]), class("c2", Some("Drills"), 4, &["Ana"], &["Marta"])];
        assert_eq!(apply(classes, &ClassFilter::default()).len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(apply(Vec::<Tournament>::new(), &TournamentFilter::default()).is_empty());
    }

    #[test]
    fn test_combined_filters() {
        let tournaments = vec![
            tournament("1", "Open Padel", 3),
            tournament("2", "Ladies Night", 5),
            tournament("3", "Summer Open", 0),
            tournament("4", "Mixed Doubles", 2),
        ];
        let rule = TournamentFilter {
            min_available_places: 1,
            blacklist: terms(&["ladies"]),
            ..Default::default()
        };
        assert_eq!(ids(&apply(tournaments, &rule)), vec!["1", "4"]);
    }

    #[test]
    fn test_blank_blacklist_term_is_ignored() {
        let rule = TournamentFilter { blacklist: terms(&["", "  "]), ..Default::default() };
        assert!(tournament("1", "Anything", 1).matches(&rule));
    }

    #[test]
    fn test_tournament_player_exclusion_is_exact() {
        let t = with_players(tournament("1", "Americano", 2), &["Ana Lopez", "Luis"]);

        let exact = TournamentFilter { player_name: Some("ana lopez".into()), ..Default::default() };
        assert!(!t.matches(&exact));

        let partial = TournamentFilter { player_name: Some("Ana".into()), ..Default::default() };
        assert!(t.matches(&partial));

        let blank = TournamentFilter { player_name: Some(" ".into()), ..Default::default() };
        assert!(t.matches(&blank));
    }

    #[test]
    fn test_class_player_exclusion_is_substring() {
        let c = class("c1", Some("Drills"), 4, &["Ana Lopez"], &[]);
        let rule = ClassFilter { player_name: Some("ANA".into()), ..Default::default() };
        assert!(!c.matches(&rule));

        let other = ClassFilter { player_name: Some("Luis".into()), ..Default::default() };
        assert!(c.matches(&other));
    }

    #[test]
    fn test_threshold_wins_over_everything_else() {
        let t = tournament("1", "Whitelisted Open", 1);
        let rule = TournamentFilter { min_available_places: 2, ..Default::default() };
        assert!(!t.matches(&rule));

        let c = class("c1", Some("Beginner Drills"), 3, &["Ana", "Luis"], &["Marta"]);
        let rule = ClassFilter {
            min_available_places: 2,
            course_names: terms(&["drills"]),
            coach_names: terms(&["marta"]),
            ..Default::default()
        };
        assert_eq!(c.available_slots(), 1);
        assert!(!c.matches(&rule));
    }

    #[test]
    fn test_class_whitelist() {
        let rule = ClassFilter { course_names: terms(&["drills", "match play"]), ..Default::default() };
        assert!(class("c1", Some("Advanced DRILLS"), 4, &[], &[]).matches(&rule));
        assert!(!class("c2", Some("Kids Academy"), 4, &[], &[]).matches(&rule));
    }

    #[test]
    fn test_class_without_course_summary_fails_whitelist() {
        let c = class("c1", None, 0, &[], &[]);
        assert!(!c.matches(&ClassFilter { course_names: terms(&["drills"]), ..Default::default() }));
        assert!(c.matches(&ClassFilter::default()));
    }

    #[test]
    fn test_class_coach_filter() {
        let c = class("c1", Some("Drills"), 4, &[], &["Marta Ruiz", "Pablo"]);
        assert!(c.matches(&ClassFilter { coach_names: terms(&["ruiz"]), ..Default::default() }));
        assert!(!c.matches(&ClassFilter { coach_names: terms(&["jorge"]), ..Default::default() }));

        let no_coach = class("c2", Some("Drills"), 4, &[], &[]);
        assert!(!no_coach.matches(&ClassFilter { coach_names: terms(&["ruiz"]), ..Default::default() }));
    }

    #[test]
    fn test_class_blacklist_uses_course_then_resource_name() {
        let mut c = class("c1", None, 0, &[], &[]);
        c.resource.name = "Kids Court".into();
        let rule = ClassFilter { blacklist: terms(&["kids"]), ..Default::default() };
        assert!(!c.matches(&rule));

        let course = class("c2", Some("Kids Academy"), 4, &[], &[]);
        assert!(!course.matches(&rule));
    }

    #[test]
    fn test_any_failing_predicate_excludes() {
        let base = class("c1", Some("Evening Drills"), 4, &["Ana"], &["Marta"]);
        let passing = ClassFilter {
            min_available_places: 1,
            blacklist: terms(&["kids"]),
            course_names: terms(&["drills"]),
            coach_names: terms(&["marta"]),
            player_name: Some("Luis".into()),
            ..Default::default()
        };
        assert!(base.matches(&passing));

        let failing = [
            ClassFilter { min_available_places: 4, ..passing.clone() },
            ClassFilter { blacklist: terms(&["evening"]), ..passing.clone() },
            ClassFilter { player_name: Some("ana".into()), ..passing.clone() },
            ClassFilter { course_names: terms(&["academy"]), ..passing.clone() },
            ClassFilter { coach_names: terms(&["pablo"]), ..passing.clone() },
        ];
        for rule in &failing {
            assert!(!base.matches(rule), "expected exclusion by {rule:?}");
        }
    }
}
