use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use dirfilter::{
    child_of, descendant_of, is_active, is_disabled, member_of, Condition, DirectoryContext,
    DirectoryFilter, DirectoryTerm, Emit, EvalError, Filter, FilterTree, Predicate, Record, Value,
};

#[derive(Debug, PartialEq)]
struct Person {
    name: &'static str,
    office: &'static str,
    groups: Vec<&'static str>,
    fave: &'static str,
}

impl Record for Person {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(self.name.into()),
            "office" => Some(self.office.into()),
            "groups" => Some(self.groups.clone().into()),
            "fave" => Some(self.fave.into()),
            _ => None,
        }
    }
}

fn person(
    name: &'static str,
    office: &'static str,
    groups: [&'static str; 2],
    fave: &'static str,
) -> Person {
    Person {
        name,
        office,
        groups: groups.to_vec(),
        fave,
    }
}

fn people() -> Vec<Person> {
    vec![
        person("Alice Agnew", "SYD", ["producers", "staff"], "Red"),
        person("Bob Brite", "LA", ["leads", "staff"], "Red"),
        person("Chuck Close", "SYD", ["producers", "freelance"], "Red"),
        person("Doug Dirtbag", "NY", ["producers", "staff"], "Green"),
        person("Edgar Equine", "NY", ["producers", "freelance"], "Blue"),
        person("Fern Fack", "LA", ["2d", "staff"], "Blue"),
    ]
}

fn in_office(office: &'static str) -> Filter<Person> {
    Filter::leaf(Condition::lambda(move |p: &Person| p.office == office))
}

fn check(property: &str, comparator: &str, value: impl Into<Value>) -> Filter<Person> {
    Filter::leaf(Condition::check(property, comparator, value).unwrap())
}

fn names<'a>(people: &[&'a Person]) -> Vec<&'a str> {
    people.iter().map(|p| p.name).collect()
}

#[test]
fn la_or_sydney_and_not_freelance() {
    let candidates = vec![
        person("Lee", "LA", ["staff", "leads"], "Red"),
        person("Sam", "SYD", ["producers", "freelance"], "Red"),
    ];
    let is_freelance = check("groups", "has", "freelance");

    let filter = in_office("LA").or([in_office("SYD")]).and([is_freelance.not()]);
    let kept = filter.filter_list(&candidates).unwrap();

    assert_eq!(kept.len(), 1);
    assert!(std::ptr::eq(kept[0], &candidates[0]));
}

#[test]
fn tree_literal_and_chained_forms_agree() {
    let people = people();
    let is_freelance = check("groups", "has", "freelance");

    let chained = in_office("LA")
        .or([in_office("SYD")])
        .and([is_freelance.clone().not()]);
    let literal = Filter::all([
        Filter::any([in_office("LA"), in_office("SYD")]),
        Filter::negation(is_freelance),
    ]);

    let chained = names(&chained.filter_list(&people).unwrap());
    let literal = names(&literal.filter_list(&people).unwrap());

    assert_eq!(chained, vec!["Alice Agnew", "Bob Brite", "Fern Fack"]);
    assert_eq!(chained, literal);
}

#[test]
fn not_sydney_or_named_alice() {
    let people = people();
    let filter = check("office", "is", "SYD")
        .not()
        .or([check("name", "has", "Alice")]);

    assert_eq!(
        names(&filter.filter_list(&people).unwrap()),
        vec![
            "Alice Agnew",
            "Bob Brite",
            "Doug Dirtbag",
            "Edgar Equine",
            "Fern Fack"
        ]
    );
}

#[test]
fn name_is_one_of_several() {
    let people = people();
    let filter = check("name", "has", "Doug").or([
        check("name", "has", "Fern"),
        check("name", "has", "Chuck"),
    ]);

    assert_eq!(
        names(&filter.filter_list(&people).unwrap()),
        vec!["Chuck Close", "Doug Dirtbag", "Fern Fack"]
    );
}

#[test]
fn comparison_ignores_case_of_text() {
    let la = person("Lee", "LA", ["staff", "leads"], "Red");

    assert!(check("office", "is", "la").test(&la).unwrap());
    assert!(check("fave", "in", "red,green").test(&la).unwrap());
}

#[test]
fn regex_filters_search_names() {
    let people = people();
    let filter: Filter<Person> = Filter::leaf(Condition::regex("name", r"^[A-C]\w+ ").unwrap());

    assert_eq!(
        names(&filter.filter_list(&people).unwrap()),
        vec!["Alice Agnew", "Bob Brite", "Chuck Close"]
    );
}

#[test]
fn missing_fields_abort_filtering() {
    let people = people();
    let filter = check("floor", "gt", Value::Int(2));

    assert_eq!(
        filter.filter_list(&people),
        Err(EvalError::MissingField {
            field: "floor".to_owned()
        })
    );
}

#[test]
fn short_circuit_skips_the_missing_field() {
    let people = people();
    let filter = check("office", "is", "LA").and([check("floor", "gt", Value::Int(2))]);
    let guarded = check("office", "is", "LA").or([check("floor", "gt", Value::Int(2))]);

    // Only LA candidates reach the second conjunct.
    assert!(filter.test(&people[0]).is_ok());
    assert!(filter.test(&people[1]).is_err());
    assert!(guarded.test(&people[1]).unwrap());
}

#[test]
fn spy_after_failing_conjunct_never_runs() {
    let calls = Arc::new(AtomicUsize::new(0));
    let spy = {
        let calls = Arc::clone(&calls);
        Filter::leaf(Condition::lambda(move |_: &Person| {
            calls.fetch_add(1, Ordering::SeqCst);
            true
        }))
    };

    let people = people();
    let conjunction = Filter::leaf(Condition::constant(false)).and([spy.clone()]);
    let disjunction = Filter::leaf(Condition::constant(true)).or([spy]);

    assert!(conjunction.filter_list(&people).unwrap().is_empty());
    assert_eq!(disjunction.filter_list(&people).unwrap().len(), people.len());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn shared_leaf_in_unrelated_trees() {
    let people = people();
    let staff = check("groups", "has", "staff");
    let la_staff = in_office("LA").and([staff.clone()]);
    let ny_staff = in_office("NY").and([staff]);

    assert_eq!(
        names(&la_staff.filter_list(&people).unwrap()),
        vec!["Bob Brite", "Fern Fack"]
    );
    assert_eq!(
        names(&ny_staff.filter_list(&people).unwrap()),
        vec!["Doug Dirtbag"]
    );
}

#[test]
fn is_active_matches_explicit_negation() {
    let explicit: DirectoryFilter = FilterTree::negation(DirectoryTerm::AccountDisabled);

    assert_eq!(is_active().emit(), explicit.emit());
    assert_eq!(is_active().emit(), is_disabled().not().emit());
}

#[test]
fn double_negation_renders_both_operators() {
    let twice = DirectoryFilter::negation(DirectoryFilter::negation(child_of("staff")));

    assert_eq!(
        twice.emit(),
        format!("(!(!{}))", child_of("staff").emit())
    );
    assert_ne!(twice.emit(), child_of("staff").emit());
}

#[test]
fn membership_forms_differ_only_in_match_rule() {
    let direct = member_of("G", false).emit();
    let transitive = member_of("G", true).emit();

    assert_eq!(direct, "(memberOf=CN=G,CN=Users,DC=example,DC=com)");
    assert_eq!(
        transitive,
        "(memberOf:1.2.840.113556.1.4.1941:=CN=G,cn=Users,dc=example,dc=com)"
    );
    assert_eq!(
        direct.to_lowercase(),
        transitive
            .replace(":1.2.840.113556.1.4.1941:=", "=")
            .to_lowercase()
    );
    assert_eq!(descendant_of("G").emit(), transitive);
}

#[test]
fn emission_follows_the_configured_context() {
    let ctx = DirectoryContext::new("psy", "tv");
    let filter = is_active().and([descendant_of("Google Groups")]);

    assert_eq!(
        filter.emit_in(&ctx),
        "(&(!(userAccountControl:1.2.840.113556.1.4.803:=2))\
         (memberOf:1.2.840.113556.1.4.1941:=CN=Google Groups,cn=Users,dc=psy,dc=tv))"
    );
}
