use dmponline::templates::{
    classify_personal_data, QuestionLocator, TemplateRegistry, Unclassified, BUILTIN_TEMPLATES,
};
use serde_json::{json, Value};
use speculate2::speculate;

/// A v0 plans response whose personal-data question sits at `locator`.
fn plan_response(template_id: i64, locator: QuestionLocator, answered: bool, option: &str) -> Value {
    json!([{
        "id": 100,
        "template": {"id": template_id, "title": "Template under test"},
        "plan_content": [{
            "sections": [
                {"number": locator.section + 1, "questions": [
                    {"number": locator.question, "answered": true,
                     "answer": {"options": [{"text": "No"}]}}
                ]},
                {"number": locator.section, "questions": [
                    {"number": locator.question + 1, "answered": true,
                     "answer": {"options": [{"text": "No"}]}},
                    {"number": locator.question, "text": "Personal data?",
                     "answered": answered,
                     "answer": {"options": [{"text": option}, {"text": "No"}]}}
                ]}
            ]
        }]
    }])
}

/// A TU Delft 2021 plan answering "Yes" at 5/2, next to one odd question in
/// section 1.
fn plan_with_sibling(sibling: Value) -> Value {
    json!([{
        "id": 100,
        "template": {"id": 975303870},
        "plan_content": [{
            "sections": [
                {"number": 1, "questions": [sibling]},
                {"number": 5, "questions": [
                    {"number": 2, "answered": true,
                     "answer": {"options": [{"text": "Yes"}]}}
                ]}
            ]
        }]
    }])
}

speculate! {
    before {
        let registry = TemplateRegistry::builtin();
        let tu_delft = QuestionLocator { section: 5, question: 2 };
    }

    describe "classify_personal_data" {
        it "returns true for Yes on the TU Delft 2021 template" {
            let raw = plan_response(975303870, tu_delft, true, "Yes");
            assert_eq!(classify_personal_data(100, &raw, false), Some(true));
        }

        it "returns false for No on the TU Delft 2021 template" {
            let raw = plan_response(975303870, tu_delft, true, "No");
            assert_eq!(classify_personal_data(100, &raw, false), Some(false));
        }

        it "returns unknown for an unanswered question" {
            let raw = plan_response(975303870, tu_delft, false, "Yes");
            assert_eq!(classify_personal_data(100, &raw, false), None);
        }

        it "gives the same answer in verbose mode" {
            let raw = plan_response(975303870, tu_delft, true, "Yes");
            assert_eq!(
                classify_personal_data(100, &raw, true),
                classify_personal_data(100, &raw, false)
            );
        }

        it "returns unknown for unregistered templates and names them" {
            for template_id in [0, 1, 975303871, 2_000_000_000] {
                let raw = plan_response(template_id, tu_delft, true, "Yes");
                assert_eq!(classify_personal_data(100, &raw, false), None);
                let reason = registry.assess(100, &raw, false).unwrap_err();
                assert_eq!(reason, Unclassified::UnsupportedTemplate { plan_id: 100, template_id });
                assert!(reason.to_string().contains(&template_id.to_string()));
            }
        }
    }

    describe "malformed siblings" {
        it "ignores questions the template does not point at" {
            let siblings = [
                json!({"number": 1, "answered": true, "answer": {"options": null}}),
                json!({"number": null, "answered": true}),
                json!({"number": 1, "answered": true, "answer": {"options": [{"text": null}]}}),
                json!({"number": 1, "answered": null, "answer": null}),
                json!({"number": 1, "answered": false}),
            ];
            for sibling in siblings {
                let raw = plan_with_sibling(sibling.clone());
                assert_eq!(classify_personal_data(100, &raw, false), Some(true), "{}", sibling);
            }
        }

        it "ignores a section without questions" {
            let raw = json!([{
                "template": {"id": 975303870},
                "plan_content": [{"sections": [
                    {"number": null, "questions": null},
                    {"number": 5, "questions": [
                        {"number": 2, "answered": true, "answer": {"options": [{"text": "No"}]}}
                    ]}
                ]}]
            }]);
            assert_eq!(classify_personal_data(100, &raw, false), Some(false));
        }

        it "still returns unknown when the located question itself lacks options" {
            let raw = json!([{
                "template": {"id": 975303870},
                "plan_content": [{"sections": [
                    {"number": 5, "questions": [
                        {"number": 2, "answered": true, "answer": {"options": null}}
                    ]}
                ]}]
            }]);
            assert_eq!(classify_personal_data(100, &raw, false), None);
        }
    }

    describe "builtin registry" {
        it "classifies every registered template at its own location" {
            for entry in BUILTIN_TEMPLATES {
                let yes = plan_response(entry.template_id, entry.locator, true, "Yes");
                let no = plan_response(entry.template_id, entry.locator, true, "No");
                assert_eq!(registry.classify(100, &yes, false), Some(true), "{}", entry.name);
                assert_eq!(registry.classify(100, &no, false), Some(false), "{}", entry.name);
            }
        }

        it "has one location per template" {
            assert_eq!(registry.len(), 5);
            for entry in BUILTIN_TEMPLATES {
                assert_eq!(registry.lookup(entry.template_id), Some(entry));
            }
        }

        it "does not find questions moved by a template revision" {
            let moved = QuestionLocator { section: 6, question: 2 };
            let raw = plan_response(975303870, moved, true, "Yes");
            assert_eq!(
                registry.assess(100, &raw, false),
                Err(Unclassified::SectionMissing { plan_id: 100, section: 5 })
            );
        }
    }
}
