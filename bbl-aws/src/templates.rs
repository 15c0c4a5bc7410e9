//! CloudFormation template assembly
//!
//! Pure translation of `(key pair name, AZ count, lb type, certificate arn)`
//! into the stack template. The same inputs always produce the same
//! document, which is what makes repeated stack updates no-ops.

use serde_json::{Map, Value, json};

pub struct TemplateBuilder;

impl TemplateBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(
        &self,
        key_pair_name: &str,
        availability_zone_count: usize,
        lb_type: &str,
        lb_certificate_arn: &str,
    ) -> Value {
        let mut resources = Map::new();
        resources.insert("VPC".to_string(), vpc());
        resources.insert("VPCGatewayInternetGateway".to_string(), internet_gateway());
        resources.insert("VPCGatewayAttachment".to_string(), gateway_attachment());
        resources.insert("BOSHSubnet".to_string(), bosh_subnet());
        resources.insert("BOSHSecurityGroup".to_string(), bosh_security_group());
        resources.insert("InternalSecurityGroup".to_string(), internal_security_group());
        resources.insert("BOSHEIP".to_string(), elastic_ip());
        resources.insert("BOSHUser".to_string(), bosh_user());
        resources.insert("BOSHUserAccessKey".to_string(), bosh_user_access_key());

        for index in 0..availability_zone_count {
            resources.insert(
                format!("InternalSubnet{}", index + 1),
                internal_subnet(index),
            );
        }

        let mut outputs = base_outputs();

        match lb_type {
            "concourse" => {
                for index in 0..availability_zone_count {
                    resources.insert(
                        format!("LoadBalancerSubnet{}", index + 1),
                        load_balancer_subnet(index),
                    );
                }
                resources.insert(
                    "ConcourseLoadBalancer".to_string(),
                    load_balancer("Concourse", availability_zone_count, lb_certificate_arn),
                );
                outputs.insert(
                    "ConcourseLoadBalancer".to_string(),
                    json!({ "Value": { "Ref": "ConcourseLoadBalancer" } }),
                );
                outputs.insert(
                    "ConcourseLoadBalancerURL".to_string(),
                    json!({ "Value": { "Fn::GetAtt": ["ConcourseLoadBalancer", "DNSName"] } }),
                );
            }
            "cf" => {
                for index in 0..availability_zone_count {
                    resources.insert(
                        format!("LoadBalancerSubnet{}", index + 1),
                        load_balancer_subnet(index),
                    );
                }
                for name in ["CFRouterLoadBalancer", "CFSSHProxyLoadBalancer"] {
                    resources.insert(
                        name.to_string(),
                        load_balancer(name, availability_zone_count, lb_certificate_arn),
                    );
                    outputs.insert(name.to_string(), json!({ "Value": { "Ref": name } }));
                    outputs.insert(
                        format!("{}URL", name),
                        json!({ "Value": { "Fn::GetAtt": [name, "DNSName"] } }),
                    );
                }
            }
            _ => {}
        }

        json!({
            "AWSTemplateFormatVersion": "2010-09-09",
            "Description": "Infrastructure for a BOSH deployment.",
            "Parameters": {
                "SSHKeyPairName": {
                    "Type": "AWS::EC2::KeyPair::KeyName",
                    "Default": key_pair_name,
                    "Description": "SSH KeyPair to use for instances"
                }
            },
            "Resources": Value::Object(resources),
            "Outputs": Value::Object(outputs),
        })
    }
}

impl Default for TemplateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn vpc() -> Value {
    json!({
        "Type": "AWS::EC2::VPC",
        "Properties": {
            "CidrBlock": "10.0.0.0/16",
            "Tags": [{ "Key": "Name", "Value": "bbl" }]
        }
    })
}

fn internet_gateway() -> Value {
    json!({ "Type": "AWS::EC2::InternetGateway" })
}

fn gateway_attachment() -> Value {
    json!({
        "Type": "AWS::EC2::VPCGatewayAttachment",
        "Properties": {
            "VpcId": { "Ref": "VPC" },
            "InternetGatewayId": { "Ref": "VPCGatewayInternetGateway" }
        }
    })
}

fn bosh_subnet() -> Value {
    json!({
        "Type": "AWS::EC2::Subnet",
        "Properties": {
            "VpcId": { "Ref": "VPC" },
            "CidrBlock": "10.0.0.0/24",
            "AvailabilityZone": { "Fn::Select": ["0", { "Fn::GetAZs": { "Ref": "AWS::Region" } }] },
            "Tags": [{ "Key": "Name", "Value": "bosh1" }]
        }
    })
}

fn internal_subnet(index: usize) -> Value {
    json!({
        "Type": "AWS::EC2::Subnet",
        "Properties": {
            "VpcId": { "Ref": "VPC" },
            "CidrBlock": format!("10.0.{}.0/20", 16 * (index + 1)),
            "AvailabilityZone": {
                "Fn::Select": [index.to_string(), { "Fn::GetAZs": { "Ref": "AWS::Region" } }]
            },
            "Tags": [{ "Key": "Name", "Value": format!("internal{}", index + 1) }]
        }
    })
}

fn load_balancer_subnet(index: usize) -> Value {
    json!({
        "Type": "AWS::EC2::Subnet",
        "Properties": {
            "VpcId": { "Ref": "VPC" },
            "CidrBlock": format!("10.0.{}.0/24", 2 + index),
            "AvailabilityZone": {
                "Fn::Select": [index.to_string(), { "Fn::GetAZs": { "Ref": "AWS::Region" } }]
            },
            "Tags": [{ "Key": "Name", "Value": format!("lb{}", index + 1) }]
        }
    })
}

fn bosh_security_group() -> Value {
    json!({
        "Type": "AWS::EC2::SecurityGroup",
        "Properties": {
            "VpcId": { "Ref": "VPC" },
            "GroupDescription": "BOSH",
            "SecurityGroupIngress": [
                { "CidrIp": "0.0.0.0/0", "IpProtocol": "tcp", "FromPort": "22", "ToPort": "22" },
                { "CidrIp": "0.0.0.0/0", "IpProtocol": "tcp", "FromPort": "6868", "ToPort": "6868" },
                { "CidrIp": "0.0.0.0/0", "IpProtocol": "tcp", "FromPort": "25555", "ToPort": "25555" }
            ]
        }
    })
}

fn internal_security_group() -> Value {
    json!({
        "Type": "AWS::EC2::SecurityGroup",
        "Properties": {
            "VpcId": { "Ref": "VPC" },
            "GroupDescription": "Internal",
            "SecurityGroupIngress": [
                { "CidrIp": "10.0.0.0/16", "IpProtocol": "-1" }
            ]
        }
    })
}

fn elastic_ip() -> Value {
    json!({
        "Type": "AWS::EC2::EIP",
        "DependsOn": "VPCGatewayAttachment",
        "Properties": { "Domain": "vpc" }
    })
}

fn bosh_user() -> Value {
    json!({
        "Type": "AWS::IAM::User",
        "Properties": {
            "Policies": [{
                "PolicyName": "aws-cpi",
                "PolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Action": ["ec2:*", "elasticloadbalancing:*"],
                        "Effect": "Allow",
                        "Resource": "*"
                    }]
                }
            }]
        }
    })
}

fn bosh_user_access_key() -> Value {
    json!({
        "Type": "AWS::IAM::AccessKey",
        "Properties": { "UserName": { "Ref": "BOSHUser" } }
    })
}

fn load_balancer(name: &str, subnet_count: usize, certificate_arn: &str) -> Value {
    let subnets: Vec<Value> = (0..subnet_count)
        .map(|index| json!({ "Ref": format!("LoadBalancerSubnet{}", index + 1) }))
        .collect();

    json!({
        "Type": "AWS::ElasticLoadBalancing::LoadBalancer",
        "DependsOn": "VPCGatewayAttachment",
        "Properties": {
            "Subnets": subnets,
            "SecurityGroups": [{ "Ref": "BOSHSecurityGroup" }],
            "CrossZone": true,
            "HealthCheck": {
                "HealthyThreshold": "2",
                "Interval": "30",
                "Target": "TCP:80",
                "Timeout": "5",
                "UnhealthyThreshold": "10"
            },
            "Listeners": [
                {
                    "Protocol": "tcp",
                    "LoadBalancerPort": "80",
                    "InstanceProtocol": "tcp",
                    "InstancePort": "80"
                },
                {
                    "Protocol": "ssl",
                    "LoadBalancerPort": "443",
                    "InstanceProtocol": "tcp",
                    "InstancePort": "80",
                    "SSLCertificateId": certificate_arn
                }
            ],
            "Tags": [{ "Key": "Name", "Value": name }]
        }
    })
}

fn base_outputs() -> Map<String, Value> {
    let mut outputs = Map::new();
    outputs.insert(
        "BOSHSubnet".to_string(),
        json!({ "Value": { "Ref": "BOSHSubnet" } }),
    );
    outputs.insert(
        "BOSHSubnetAZ".to_string(),
        json!({ "Value": { "Fn::GetAtt": ["BOSHSubnet", "AvailabilityZone"] } }),
    );
    outputs.insert(
        "BOSHSecurityGroup".to_string(),
        json!({ "Value": { "Ref": "BOSHSecurityGroup" } }),
    );
    outputs.insert(
        "BOSHEIP".to_string(),
        json!({ "Value": { "Ref": "BOSHEIP" } }),
    );
    outputs.insert(
        "BOSHUserAccessKey".to_string(),
        json!({ "Value": { "Ref": "BOSHUserAccessKey" } }),
    );
    outputs.insert(
        "BOSHUserSecretAccessKey".to_string(),
        json!({ "Value": { "Fn::GetAtt": ["BOSHUserAccessKey", "SecretAccessKey"] } }),
    );
    outputs
}
