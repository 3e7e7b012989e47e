//! Admin command handling over the in-memory store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};

use ship_restrict_core::{LicenseCheck, ProductId, RuleLogic, TargetKind, TermId};
use ship_restrict_engine::admin::{
    AddRuleCommand, AdminService, NoticeKind, SaveItemRestrictionsCommand, SaveLicenseCommand,
    SaveMessageCommand, UpgradeContext,
};
use ship_restrict_engine::license::{LicenseApi, LicenseManager};
use ship_restrict_engine::store::{
    Catalog, MemoryStore, MetaField, MetaOwner, MetadataStore, SettingsStore,
};
use ship_restrict_engine::{Clock, FixedClock, RuleStore};

struct StubState {
    calls: AtomicUsize,
    result: Mutex<LicenseCheck>,
}

#[derive(Clone)]
struct StubApi(Arc<StubState>);

impl StubApi {
    fn returning(check: LicenseCheck) -> Self {
        Self(Arc::new(StubState {
            calls: AtomicUsize::new(0),
            result: Mutex::new(check),
        }))
    }

    fn set_result(&self, check: LicenseCheck) {
        *self.0.result.lock().expect("stub lock") = check;
    }

    fn calls(&self) -> usize {
        self.0.calls.load(Ordering::SeqCst)
    }
}

impl LicenseApi for StubApi {
    fn validate_or_activate(
        &self,
        _key: &str,
        _activate: bool,
    ) -> impl Future<Output = LicenseCheck> + Send {
        self.0.calls.fetch_add(1, Ordering::SeqCst);
        std::future::ready(self.0.result.lock().expect("stub lock").clone())
    }
}

fn service_parts(
    store: &Arc<MemoryStore>,
    check: LicenseCheck,
) -> (Arc<FixedClock>, StubApi, AdminService<StubApi>) {
    let clock = Arc::new(FixedClock::new(Utc::now()));
    let api = StubApi::returning(check);
    let settings = Arc::clone(store) as Arc<dyn SettingsStore>;
    let metadata = Arc::clone(store) as Arc<dyn MetadataStore>;
    let catalog = Arc::clone(store) as Arc<dyn Catalog>;
    let rules = RuleStore::new(Arc::clone(&settings), catalog);
    let license = LicenseManager::new(
        Arc::clone(&settings),
        Arc::clone(&clock) as Arc<dyn Clock>,
        api.clone(),
    );
    (clock, api, AdminService::new(rules, license, settings, metadata))
}

fn service(store: &Arc<MemoryStore>, check: LicenseCheck) -> AdminService<StubApi> {
    service_parts(store, check).2
}

fn add_rule_command(name: &str, term_id: TermId) -> AddRuleCommand {
    AddRuleCommand {
        name: name.to_string(),
        term_id,
        logic: RuleLogic::BlockFrom,
        states: vec!["CA".to_string()],
        state_cities: Vec::new(),
        zip_codes: String::new(),
    }
}

fn seed_term(store: &MemoryStore, term_id: TermId) {
    store.insert_term(term_id, "Ammunition", TargetKind::Category);
}

#[tokio::test]
async fn adding_a_rule_reports_success_and_persists() {
    let store = Arc::new(MemoryStore::new());
    let term = TermId::new(10);
    seed_term(&store, term);
    let admin = service(&store, LicenseCheck::valid("p_test"));

    let notice = admin
        .add_rule(add_rule_command("No Ammo", term))
        .await
        .expect("add");
    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(notice.text, "Rule added successfully.");

    let views = admin.rules_for_display().await.expect("display");
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].rule.name, "No Ammo");
    assert_eq!(views[0].target_name, "Ammunition");
}

#[tokio::test]
async fn blank_rule_name_is_rejected_with_the_form_error() {
    let store = Arc::new(MemoryStore::new());
    let term = TermId::new(10);
    seed_term(&store, term);
    let admin = service(&store, LicenseCheck::valid("p_test"));

    let notice = admin
        .add_rule(add_rule_command("   ", term))
        .await
        .expect("add");
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(
        notice.text,
        "Failed to add rule. Please fill all required fields."
    );
}

#[tokio::test]
async fn third_rule_is_rejected_without_a_license() {
    let store = Arc::new(MemoryStore::new());
    let term = TermId::new(10);
    seed_term(&store, term);
    let admin = service(&store, LicenseCheck::valid("p_test"));

    for name in ["One", "Two"] {
        let notice = admin
            .add_rule(add_rule_command(name, term))
            .await
            .expect("add");
        assert_eq!(notice.kind, NoticeKind::Success);
    }

    let notice = admin
        .add_rule(add_rule_command("Three", term))
        .await
        .expect("add");
    assert_eq!(notice.kind, NoticeKind::Error);
    assert!(notice.text.contains("Upgrade to Pro"));
    assert_eq!(admin.rules_for_display().await.expect("display").len(), 2);
}

#[tokio::test]
async fn a_valid_license_lifts_the_rule_ceiling() {
    let store = Arc::new(MemoryStore::new());
    let term = TermId::new(10);
    seed_term(&store, term);
    let admin = service(&store, LicenseCheck::valid("p_test"));

    let (notice, state) = admin
        .save_license(SaveLicenseCommand {
            key: "key-1".to_string(),
        })
        .await
        .expect("save license");
    assert_eq!(notice.kind, NoticeKind::Success);
    assert!(state.valid);

    for name in ["One", "Two", "Three"] {
        let notice = admin
            .add_rule(add_rule_command(name, term))
            .await
            .expect("add");
        assert_eq!(notice.kind, NoticeKind::Success, "rule {name}");
    }
    assert_eq!(admin.rules_for_display().await.expect("display").len(), 3);
}

#[tokio::test]
async fn a_stale_revoked_license_regates_the_rule_ceiling() {
    let store = Arc::new(MemoryStore::new());
    let term = TermId::new(10);
    seed_term(&store, term);
    let (clock, api, admin) = service_parts(&store, LicenseCheck::valid("p_test"));

    admin
        .save_license(SaveLicenseCommand {
            key: "key-1".to_string(),
        })
        .await
        .expect("save license");
    assert_eq!(api.calls(), 1);

    // The key is revoked server-side; the cached "valid" flag goes stale a
    // day later and the next admin access revalidates it.
    api.set_result(LicenseCheck::invalid("License invalid.", "p_test"));
    clock.advance(Duration::hours(25));

    for name in ["One", "Two"] {
        let notice = admin
            .add_rule(add_rule_command(name, term))
            .await
            .expect("add");
        assert_eq!(notice.kind, NoticeKind::Success, "rule {name}");
    }
    let notice = admin
        .add_rule(add_rule_command("Three", term))
        .await
        .expect("add");
    assert_eq!(notice.kind, NoticeKind::Error);
    assert!(notice.text.contains("Upgrade to Pro"));

    assert_eq!(admin.rules_for_display().await.expect("display").len(), 2);
    // Exactly one revalidation for the whole stale window.
    assert_eq!(api.calls(), 2);

    // The prompts are back too.
    assert!(admin
        .upgrade_prompt(UpgradeContext::Rules)
        .await
        .expect("prompt")
        .is_some());
}

#[tokio::test]
async fn failed_license_check_surfaces_the_server_message() {
    let store = Arc::new(MemoryStore::new());
    let admin = service(
        &store,
        LicenseCheck::invalid("License server error (403). Key revoked", "p_test"),
    );

    let (notice, state) = admin
        .save_license(SaveLicenseCommand {
            key: "key-1".to_string(),
        })
        .await
        .expect("save license");
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.text, "License server error (403). Key revoked");
    assert!(!state.valid);
}

#[tokio::test]
async fn deleting_by_id_and_by_stale_index() {
    let store = Arc::new(MemoryStore::new());
    let term = TermId::new(10);
    seed_term(&store, term);
    let admin = service(&store, LicenseCheck::valid("p_test"));

    admin
        .add_rule(add_rule_command("No Ammo", term))
        .await
        .expect("add");
    let views = admin.rules_for_display().await.expect("display");
    let id = views[0].rule.id;

    let notice = admin.delete_rule(id).expect("delete");
    assert_eq!(notice.text, "Rule deleted successfully.");
    assert!(admin.rules_for_display().await.expect("display").is_empty());

    // The index captured before the delete is now out of range.
    let notice = admin.delete_rule_at(0).expect("delete");
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.text, "Rule not found.");
}

#[test]
fn message_template_is_saved_trimmed() {
    let store = Arc::new(MemoryStore::new());
    let admin = service(&store, LicenseCheck::valid("p_test"));

    let notice = admin
        .save_message(SaveMessageCommand {
            message: "  No {product} here. ".to_string(),
        })
        .expect("save");
    assert_eq!(notice.kind, NoticeKind::Success);

    let record = store.load().expect("load");
    assert_eq!(record.message, "No {product} here.");
}

#[tokio::test]
async fn third_restricted_product_is_rejected_without_a_license() {
    let store = Arc::new(MemoryStore::new());
    let admin = service(&store, LicenseCheck::valid("p_test"));

    for id in [1, 2] {
        let notice = admin
            .save_item_restrictions(
                MetaOwner::Product(ProductId::new(id)),
                SaveItemRestrictionsCommand {
                    states: vec!["CA".to_string()],
                    ..SaveItemRestrictionsCommand::default()
                },
            )
            .await
            .expect("save");
        assert_eq!(notice.kind, NoticeKind::Success);
    }

    let notice = admin
        .save_item_restrictions(
            MetaOwner::Product(ProductId::new(3)),
            SaveItemRestrictionsCommand {
                states: vec!["CA".to_string()],
                ..SaveItemRestrictionsCommand::default()
            },
        )
        .await
        .expect("save");
    assert_eq!(notice.kind, NoticeKind::Error);
    assert!(notice.text.contains("Upgrade to Pro"));
    assert_eq!(store.count_restricted_products().expect("count"), 2);
}

#[tokio::test]
async fn already_restricted_product_stays_editable_past_the_ceiling() {
    let store = Arc::new(MemoryStore::new());
    let admin = service(&store, LicenseCheck::valid("p_test"));

    for id in [1, 2] {
        admin
            .save_item_restrictions(
                MetaOwner::Product(ProductId::new(id)),
                SaveItemRestrictionsCommand {
                    states: vec!["CA".to_string()],
                    ..SaveItemRestrictionsCommand::default()
                },
            )
            .await
            .expect("save");
    }

    // Editing one of the two already-restricted products is allowed.
    let owner = MetaOwner::Product(ProductId::new(1));
    let notice = admin
        .save_item_restrictions(
            owner,
            SaveItemRestrictionsCommand {
                states: vec!["CA".to_string(), "NY".to_string()],
                ..SaveItemRestrictionsCommand::default()
            },
        )
        .await
        .expect("save");
    assert_eq!(notice.kind, NoticeKind::Success);

    // Clearing is always allowed, even for a new entity.
    let notice = admin
        .save_item_restrictions(
            MetaOwner::Product(ProductId::new(3)),
            SaveItemRestrictionsCommand::default(),
        )
        .await
        .expect("save");
    assert_eq!(notice.kind, NoticeKind::Success);
}

#[tokio::test]
async fn item_restrictions_drop_unknown_state_codes_and_split_zips() {
    let store = Arc::new(MemoryStore::new());
    let admin = service(&store, LicenseCheck::valid("p_test"));
    let owner = MetaOwner::Product(ProductId::new(1));

    admin
        .save_item_restrictions(
            owner,
            SaveItemRestrictionsCommand {
                states: vec!["CA".to_string(), "ZZ".to_string()],
                cities: Vec::new(),
                zip_codes: "90210, 10001 ,".to_string(),
            },
        )
        .await
        .expect("save");

    let states = store
        .read(owner, MetaField::States)
        .expect("read")
        .expect("stored")
        .into_items();
    assert_eq!(states, vec!["CA"]);

    let zips = store
        .read(owner, MetaField::ZipCodes)
        .expect("read")
        .expect("stored")
        .into_items();
    assert_eq!(zips, vec!["90210", "10001"]);
}

#[tokio::test]
async fn upgrade_prompts_disappear_once_licensed() {
    let store = Arc::new(MemoryStore::new());
    let admin = service(&store, LicenseCheck::valid("p_test"));

    let rules_prompt = admin
        .upgrade_prompt(UpgradeContext::Rules)
        .await
        .expect("prompt")
        .expect("unlicensed prompt");
    assert!(rules_prompt.contains("2 restriction rules"));
    assert!(rules_prompt.contains("Upgrade to Pro"));

    let products_prompt = admin
        .upgrade_prompt(UpgradeContext::Products)
        .await
        .expect("prompt")
        .expect("unlicensed prompt");
    assert!(products_prompt.contains("2 product restrictions"));

    admin
        .save_license(SaveLicenseCommand {
            key: "key-1".to_string(),
        })
        .await
        .expect("save license");
    assert!(admin
        .upgrade_prompt(UpgradeContext::Rules)
        .await
        .expect("prompt")
        .is_none());
}
