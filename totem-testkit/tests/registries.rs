use cosmwasm_std::testing::{message_info, mock_dependencies, mock_env};
use cosmwasm_std::{coins, from_json, Addr, Binary, Uint128};

use totem_registry_api::{
    AvatarData, AvatarInstantiateMsg, AvatarTokenId, BalanceResponse, Category,
    ComponentInstantiateMsg, InstanceId, OwnedInstanceResponse, SlotInstances, SlotTemplates,
    Template, TemplateId, TemplateIdsResponse, TemplatesResponse,
};
use totem_testkit::avatar_registry::{self, AvatarRegistryError};
use totem_testkit::component_registry::{self, ComponentRegistryError};

const DENOM: &str = "utotem";
const CREATION_FEE: u128 = 200;

type MockDeps = cosmwasm_std::OwnedDeps<
    cosmwasm_std::MemoryStorage,
    cosmwasm_std::testing::MockApi,
    cosmwasm_std::testing::MockQuerier,
>;

fn addr(deps: &MockDeps, name: &str) -> Addr {
    deps.api.addr_make(name)
}

fn setup_component() -> MockDeps {
    let mut deps = mock_dependencies();
    let deployer = deps.api.addr_make("deployer");
    let info = message_info(&deployer, &[]);
    component_registry::instantiate(
        deps.as_mut(),
        mock_env(),
        info,
        ComponentInstantiateMsg {
            creation_fee: Uint128::new(CREATION_FEE),
            denom: DENOM.to_string(),
        },
    )
    .unwrap();
    deps
}

fn setup_avatar() -> MockDeps {
    let mut deps = mock_dependencies();
    let deployer = deps.api.addr_make("deployer");
    let registry = deps.api.addr_make("component-registry");
    let info = message_info(&deployer, &[]);
    avatar_registry::instantiate(
        deps.as_mut(),
        mock_env(),
        info,
        AvatarInstantiateMsg {
            name: "Totem Avatars".to_string(),
            symbol: "TOTEM".to_string(),
            component_registry: registry.to_string(),
        },
    )
    .unwrap();
    deps
}

fn create_template(
    deps: &mut MockDeps,
    creator: &Addr,
    category: Category,
    name: &str,
    price: u128,
    max_supply: u64,
) -> TemplateId {
    let info = message_info(creator, &coins(CREATION_FEE, DENOM));
    let res = component_registry::execute_create_template(
        deps.as_mut(),
        mock_env(),
        info,
        name.to_string(),
        category,
        max_supply,
        Uint128::new(price),
        Binary::from(name.as_bytes()),
    )
    .unwrap();
    let id = res
        .attributes
        .iter()
        .find(|a| a.key == "template_id")
        .and_then(|a| a.value.parse().ok())
        .unwrap();
    TemplateId(id)
}

// ─── Component registry: templates ──────────────────────────────────────────

#[test]
fn test_create_template_records_catalog_entry() {
    let mut deps = setup_component();
    let creator = addr(&deps, "creator");

    let id = create_template(&mut deps, &creator, Category::Eyes, "laser", 5, 100);

    let ids: TemplateIdsResponse = from_json(
        component_registry::query_templates_of_category(deps.as_ref(), Category::Eyes).unwrap(),
    )
    .unwrap();
    assert_eq!(ids.template_ids, vec![id]);

    let templates: TemplatesResponse = from_json(
        component_registry::query_get_templates(deps.as_ref(), vec![id]).unwrap(),
    )
    .unwrap();
    let template: &Template = &templates.templates[0];
    assert_eq!(template.name, "laser");
    assert_eq!(template.creator, creator);
    assert_eq!(template.price, Uint128::new(5));
    assert_eq!(template.current_supply, 0);
    assert!(template.is_active);
}

#[test]
fn test_create_template_requires_exact_fee() {
    let mut deps = setup_component();
    let creator = addr(&deps, "creator");

    let info = message_info(&creator, &coins(CREATION_FEE - 1, DENOM));
    let err = component_registry::execute_create_template(
        deps.as_mut(),
        mock_env(),
        info,
        "laser".to_string(),
        Category::Eyes,
        100,
        Uint128::new(5),
        Binary::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ComponentRegistryError::WrongPayment {
            expected: Uint128::new(CREATION_FEE),
            got: Uint128::new(CREATION_FEE - 1),
        }
    );
}

#[test]
fn test_create_template_rejects_body_category() {
    let mut deps = setup_component();
    let creator = addr(&deps, "creator");

    let info = message_info(&creator, &coins(CREATION_FEE, DENOM));
    let err = component_registry::execute_create_template(
        deps.as_mut(),
        mock_env(),
        info,
        "torso".to_string(),
        Category::Body,
        100,
        Uint128::new(5),
        Binary::default(),
    )
    .unwrap_err();
    assert_eq!(err, ComponentRegistryError::BodyFixed);
}

// ─── Component registry: minting ────────────────────────────────────────────

#[test]
fn test_mint_components_enforces_exact_payment() {
    let mut deps = setup_component();
    let creator = addr(&deps, "creator");
    let user = addr(&deps, "user");
    let t1 = create_template(&mut deps, &creator, Category::Eyes, "laser", 5, 100);
    let t2 = create_template(&mut deps, &creator, Category::Mouth, "grin", 7, 100);

    let info = message_info(&user, &coins(11, DENOM));
    let err = component_registry::execute_mint_components(
        deps.as_mut(),
        mock_env(),
        info,
        vec![t1, t2],
    )
    .unwrap_err();
    assert_eq!(
        err,
        ComponentRegistryError::WrongPayment {
            expected: Uint128::new(12),
            got: Uint128::new(11),
        }
    );

    let info = message_info(&user, &coins(12, DENOM));
    let res = component_registry::execute_mint_components(
        deps.as_mut(),
        mock_env(),
        info,
        vec![t1, t2],
    )
    .unwrap();
    assert_eq!(res.attributes[1].value, "2");
}

#[test]
fn test_mint_components_skips_owned_template_without_charge() {
    let mut deps = setup_component();
    let creator = addr(&deps, "creator");
    let user = addr(&deps, "user");
    let t1 = create_template(&mut deps, &creator, Category::Eyes, "laser", 5, 100);

    let info = message_info(&user, &coins(5, DENOM));
    component_registry::execute_mint_components(deps.as_mut(), mock_env(), info, vec![t1])
        .unwrap();

    // Second mint of the same template: nothing owed, nothing minted.
    let info = message_info(&user, &[]);
    let res = component_registry::execute_mint_components(deps.as_mut(), mock_env(), info, vec![t1])
        .unwrap();
    assert_eq!(res.attributes[1].value, "0");

    let owned: OwnedInstanceResponse = from_json(
        component_registry::query_get_owned_instance(deps.as_ref(), user.to_string(), t1)
            .unwrap(),
    )
    .unwrap();
    assert_eq!(owned.instance_id, 1);

    let templates: TemplatesResponse = from_json(
        component_registry::query_get_templates(deps.as_ref(), vec![t1]).unwrap(),
    )
    .unwrap();
    assert_eq!(templates.templates[0].current_supply, 1);
}

#[test]
fn test_mint_components_respects_supply_cap() {
    let mut deps = setup_component();
    let creator = addr(&deps, "creator");
    let user_a = addr(&deps, "user_a");
    let user_b = addr(&deps, "user_b");
    let scarce = create_template(&mut deps, &creator, Category::Accessory, "one-off", 3, 1);

    let info = message_info(&user_a, &coins(3, DENOM));
    component_registry::execute_mint_components(deps.as_mut(), mock_env(), info, vec![scarce])
        .unwrap();

    let info = message_info(&user_b, &coins(3, DENOM));
    let err =
        component_registry::execute_mint_components(deps.as_mut(), mock_env(), info, vec![scarce])
            .unwrap_err();
    assert_eq!(
        err,
        ComponentRegistryError::TemplateSoldOut { template_id: scarce.0 }
    );
}

#[test]
fn test_mint_components_rejects_inactive_template() {
    let mut deps = setup_component();
    let creator = addr(&deps, "creator");
    let user = addr(&deps, "user");
    let t1 = create_template(&mut deps, &creator, Category::Eyes, "laser", 5, 100);
    component_registry::set_template_active(deps.as_mut(), t1, false).unwrap();

    let info = message_info(&user, &coins(5, DENOM));
    let err =
        component_registry::execute_mint_components(deps.as_mut(), mock_env(), info, vec![t1])
            .unwrap_err();
    assert_eq!(
        err,
        ComponentRegistryError::TemplateInactive { template_id: t1.0 }
    );
}

#[test]
fn test_owned_instance_query_returns_zero_sentinel() {
    let mut deps = setup_component();
    let creator = addr(&deps, "creator");
    let user = addr(&deps, "user");
    let t1 = create_template(&mut deps, &creator, Category::Eyes, "laser", 5, 100);

    let owned: OwnedInstanceResponse = from_json(
        component_registry::query_get_owned_instance(deps.as_ref(), user.to_string(), t1)
            .unwrap(),
    )
    .unwrap();
    assert_eq!(owned.instance_id, 0);
}

// ─── Avatar registry ────────────────────────────────────────────────────────

fn slots(values: [u64; 5]) -> SlotInstances {
    SlotInstances {
        background: values[0],
        hairstyle: values[1],
        eyes: values[2],
        mouth: values[3],
        accessory: values[4],
    }
}

#[test]
fn test_create_avatar_is_one_per_wallet() {
    let mut deps = setup_avatar();
    let user = addr(&deps, "user");

    let info = message_info(&user, &[]);
    let res = avatar_registry::execute_create_avatar(
        deps.as_mut(),
        mock_env(),
        info.clone(),
        "Totem".to_string(),
        slots([1, 2, 3, 4, 5]),
    )
    .unwrap();
    assert_eq!(res.attributes[1].value, "1");

    let err = avatar_registry::execute_create_avatar(
        deps.as_mut(),
        mock_env(),
        info,
        "Another".to_string(),
        slots([1, 2, 3, 4, 5]),
    )
    .unwrap_err();
    assert_eq!(err, AvatarRegistryError::AlreadyOwnsAvatar { owner: user.clone() });

    let balance: BalanceResponse = from_json(
        avatar_registry::query_balance_of(deps.as_ref(), user.to_string()).unwrap(),
    )
    .unwrap();
    assert_eq!(balance.balance, 1);
}

#[test]
fn test_change_composition_requires_owner() {
    let mut deps = setup_avatar();
    let user = addr(&deps, "user");
    let stranger = addr(&deps, "stranger");

    let info = message_info(&user, &[]);
    avatar_registry::execute_create_avatar(
        deps.as_mut(),
        mock_env(),
        info,
        "Totem".to_string(),
        slots([1, 2, 3, 4, 5]),
    )
    .unwrap();

    let info = message_info(&stranger, &[]);
    let err = avatar_registry::execute_change_composition(
        deps.as_mut(),
        mock_env(),
        info,
        AvatarTokenId(1),
        slots([9, 2, 3, 4, 5]),
    )
    .unwrap_err();
    assert_eq!(err, AvatarRegistryError::NotTokenOwner);
}

#[test]
fn test_change_composition_replaces_full_slot_state() {
    let mut deps = setup_avatar();
    let user = addr(&deps, "user");

    let info = message_info(&user, &[]);
    avatar_registry::execute_create_avatar(
        deps.as_mut(),
        mock_env(),
        info.clone(),
        "Totem".to_string(),
        slots([1, 2, 3, 4, 5]),
    )
    .unwrap();

    avatar_registry::execute_change_composition(
        deps.as_mut(),
        mock_env(),
        info,
        AvatarTokenId(1),
        slots([1, 2, 9, 4, 0]),
    )
    .unwrap();

    let avatar: AvatarData = from_json(
        avatar_registry::query_get_avatar(deps.as_ref(), AvatarTokenId(1)).unwrap(),
    )
    .unwrap();
    assert_eq!(avatar.slots.eyes, 9);
    // An unset slot is a valid state.
    assert_eq!(avatar.slots.resolved(Category::Accessory), None);
    assert_eq!(avatar.slots.resolved(Category::Mouth), Some(InstanceId(4)));
}

#[test]
fn test_burn_frees_the_wallet_for_a_new_avatar() {
    let mut deps = setup_avatar();
    let user = addr(&deps, "user");

    let info = message_info(&user, &[]);
    avatar_registry::execute_create_avatar(
        deps.as_mut(),
        mock_env(),
        info.clone(),
        "Totem".to_string(),
        slots([1, 2, 3, 4, 5]),
    )
    .unwrap();
    avatar_registry::execute_burn(deps.as_mut(), mock_env(), info.clone(), AvatarTokenId(1))
        .unwrap();

    let balance: BalanceResponse = from_json(
        avatar_registry::query_balance_of(deps.as_ref(), user.to_string()).unwrap(),
    )
    .unwrap();
    assert_eq!(balance.balance, 0);

    // Token ids keep counting up across burns.
    let res = avatar_registry::execute_create_avatar(
        deps.as_mut(),
        mock_env(),
        info,
        "Reborn".to_string(),
        slots([1, 2, 3, 4, 5]),
    )
    .unwrap();
    assert_eq!(res.attributes[1].value, "2");
}

#[test]
fn test_update_name_rejects_empty() {
    let mut deps = setup_avatar();
    let user = addr(&deps, "user");

    let info = message_info(&user, &[]);
    avatar_registry::execute_create_avatar(
        deps.as_mut(),
        mock_env(),
        info.clone(),
        "Totem".to_string(),
        slots([1, 2, 3, 4, 5]),
    )
    .unwrap();

    let err = avatar_registry::execute_update_name(
        deps.as_mut(),
        mock_env(),
        info,
        AvatarTokenId(1),
        "  ".to_string(),
    )
    .unwrap_err();
    assert_eq!(err, AvatarRegistryError::EmptyName);
}

// ─── Avatar-mint support path ───────────────────────────────────────────────

#[test]
fn test_mint_for_avatar_charges_full_price_and_reuses_owned() {
    let mut deps = setup_component();
    let creator = addr(&deps, "creator");
    let user = addr(&deps, "user");
    let chosen = SlotTemplates {
        background: create_template(&mut deps, &creator, Category::Background, "aurora", 10, 100),
        hairstyle: create_template(&mut deps, &creator, Category::Hairstyle, "mohawk", 20, 100),
        eyes: create_template(&mut deps, &creator, Category::Eyes, "laser", 5, 100),
        mouth: create_template(&mut deps, &creator, Category::Mouth, "grin", 5, 100),
        accessory: create_template(&mut deps, &creator, Category::Accessory, "halo", 5, 100),
    };

    // The user already owns an eyes instance.
    let info = message_info(&user, &coins(5, DENOM));
    component_registry::execute_mint_components(
        deps.as_mut(),
        mock_env(),
        info,
        vec![chosen.eyes],
    )
    .unwrap();

    let err =
        component_registry::mint_for_avatar(deps.as_mut(), &user, &chosen, Uint128::new(40))
            .unwrap_err();
    assert!(matches!(err, ComponentRegistryError::WrongPayment { .. }));

    let assigned =
        component_registry::mint_for_avatar(deps.as_mut(), &user, &chosen, Uint128::new(45))
            .unwrap();
    // The owned eyes instance is reused, not re-minted.
    assert_eq!(assigned.resolved(Category::Eyes), Some(InstanceId(1)));
    for category in Category::SLOTS {
        assert!(assigned.resolved(category).is_some());
    }

    let templates: TemplatesResponse = from_json(
        component_registry::query_get_templates(deps.as_ref(), vec![chosen.eyes]).unwrap(),
    )
    .unwrap();
    assert_eq!(templates.templates[0].current_supply, 1);
}
