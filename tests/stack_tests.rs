//! Integration tests for the desired-state description.
//!
//! These cover the externally observable properties of the built-in stack:
//! exactly three resources with the instance depending on the image lookup
//! and the security group, an SSH-only ingress rule scoped to the supplied
//! range, and one output defined in terms of the instance's public DNS name.

use pretty_assertions::assert_eq;
use rustform::inputs::Inputs;
use rustform::resources::{ResourceKind, ResourceSpec};
use rustform::stack::{OutputAttribute, Stack, INSTANCE_TYPE, SSH_PORT};

fn stack() -> Stack {
    let inputs = Inputs::resolve(&[
        "ssh_cidr=203.0.113.0/24".to_string(),
        "key_name=deployer".to_string(),
    ])
    .unwrap();
    Stack::web_service(&inputs)
}

#[test]
fn desired_state_has_one_of_each_resource() {
    let stack = stack();
    let desired = stack.desired_state();

    let count = |kind: ResourceKind| {
        desired
            .resources
            .iter()
            .filter(|spec| spec.addr().kind == kind)
            .count()
    };
    assert_eq!(count(ResourceKind::Ami), 1);
    assert_eq!(count(ResourceKind::SecurityGroup), 1);
    assert_eq!(count(ResourceKind::Instance), 1);
    assert_eq!(desired.resources.len(), 3);
}

#[test]
fn instance_references_both_other_resources() {
    let stack = stack();
    let desired = stack.desired_state();
    let instance = desired.get(&"instance.web".parse().unwrap()).unwrap();

    let deps: Vec<String> = instance
        .depends_on()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert!(deps.contains(&"ami.web".to_string()));
    assert!(deps.contains(&"security_group.web_ssh".to_string()));
    assert_eq!(deps.len(), 2);
}

#[test]
fn execution_order_places_dependencies_before_the_instance() {
    let stack = stack();
    let order = stack
        .desired_state()
        .dependency_graph()
        .execution_order()
        .unwrap();
    let names: Vec<String> = order.iter().map(ToString::to_string).collect();
    let pos = |a: &str| names.iter().position(|n| n == a).unwrap();
    assert!(pos("ami.web") < pos("instance.web"));
    assert!(pos("security_group.web_ssh") < pos("instance.web"));
}

#[test]
fn security_group_allows_only_ssh_from_the_supplied_range() {
    let stack = stack();
    let spec = stack
        .desired_state()
        .get(&"security_group.web_ssh".parse().unwrap())
        .unwrap();
    let ResourceSpec::SecurityGroup(sg) = spec else {
        panic!("expected a security group spec");
    };

    assert_eq!(sg.ingress.len(), 1);
    assert_eq!(sg.ingress[0].protocol, "tcp");
    assert_eq!(sg.ingress[0].from_port, SSH_PORT);
    assert_eq!(sg.ingress[0].to_port, SSH_PORT);
    assert_eq!(sg.ingress[0].cidr.to_string(), "203.0.113.0/24");

    assert_eq!(sg.egress.len(), 1);
    assert_eq!(sg.egress[0].protocol, "-1");
    assert_eq!(sg.egress[0].cidr.to_string(), "0.0.0.0/0");
}

#[test]
fn instance_carries_fixed_size_and_supplied_key() {
    let stack = stack();
    let spec = stack
        .desired_state()
        .get(&"instance.web".parse().unwrap())
        .unwrap();
    let ResourceSpec::Instance(instance) = spec else {
        panic!("expected an instance spec");
    };

    assert_eq!(instance.instance_type, INSTANCE_TYPE);
    assert_eq!(instance.key_name, "deployer");
    assert!(instance.instance_profile.is_some());
}

#[test]
fn the_single_output_reads_the_instance_public_dns() {
    let stack = stack();
    let outputs = &stack.desired_state().outputs;
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].name, "public_dns");
    assert_eq!(outputs[0].resource.to_string(), "instance.web");
    assert_eq!(outputs[0].attribute, OutputAttribute::PublicDns);
}

#[test]
fn stack_validation_accepts_the_built_in_stack() {
    stack().validate().unwrap();
}
