//! Provider identity registry.
//!
//! Every provider kind is a string identifier within one taxonomy. Identifiers
//! other than access kinds are composed as `<access-kind>-<capability>`, or
//! equal the access kind itself when the provider has a single capability.
//!
//! Tables are kept in ASCII order. Entries are only ever added: persisted
//! workflow configurations reference them by value.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Identifier namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
pub enum Taxonomy {
    #[display("access")]
    Access,
    #[display("certificate authority")]
    CertificateAuthority,
    #[display("acme dns-01")]
    AcmeDns01,
    #[display("deployment")]
    Deployment,
    #[display("notification")]
    Notification,
}

impl Taxonomy {
    pub const ALL: [Taxonomy; 5] = [
        Taxonomy::Access,
        Taxonomy::CertificateAuthority,
        Taxonomy::AcmeDns01,
        Taxonomy::Deployment,
        Taxonomy::Notification,
    ];

    /// All identifiers registered in this taxonomy.
    pub fn identifiers(self) -> &'static [&'static str] {
        match self {
            Taxonomy::Access => ACCESS_PROVIDERS,
            Taxonomy::CertificateAuthority => CA_PROVIDERS,
            Taxonomy::AcmeDns01 => ACME_DNS01_PROVIDERS,
            Taxonomy::Deployment => DEPLOYMENT_PROVIDERS,
            Taxonomy::Notification => NOTIFICATION_PROVIDERS,
        }
    }

    /// Short name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Taxonomy::Access => "access",
            Taxonomy::CertificateAuthority => "ca",
            Taxonomy::AcmeDns01 => "acme-dns01",
            Taxonomy::Deployment => "deployment",
            Taxonomy::Notification => "notification",
        }
    }
}

impl std::str::FromStr for Taxonomy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Taxonomy::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::invalid("taxonomy", format!("unknown taxonomy '{}'", s)))
    }
}

/// A registered provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{id}")]
pub struct ProviderIdentifier {
    taxonomy: Taxonomy,
    id: &'static str,
}

impl ProviderIdentifier {
    /// Look up an identifier exactly as written.
    pub fn resolve(taxonomy: Taxonomy, id: &str) -> Result<Self> {
        let table = taxonomy.identifiers();
        table
            .binary_search_by(|entry| (*entry).cmp(id))
            .map(|idx| Self {
                taxonomy,
                id: table[idx],
            })
            .map_err(|_| Error::UnknownProvider {
                taxonomy,
                id: id.to_string(),
            })
    }

    /// Look up an identifier, following legacy aliases to the canonical entry.
    pub fn canonical(taxonomy: Taxonomy, id: &str) -> Result<Self> {
        let resolved = Self::resolve(taxonomy, id)?;
        match LEGACY_ALIASES
            .iter()
            .find(|(t, legacy, _)| *t == taxonomy && *legacy == resolved.id)
        {
            Some((_, _, target)) => Self::resolve(taxonomy, target),
            None => Ok(resolved),
        }
    }

    pub fn taxonomy(&self) -> Taxonomy {
        self.taxonomy
    }

    pub fn as_str(&self) -> &'static str {
        self.id
    }

    /// The access kind this provider authenticates with.
    pub fn access_kind(&self) -> &'static str {
        self.id.split_once('-').map(|(prefix, _)| prefix).unwrap_or(self.id)
    }

    /// The capability suffix, absent for base identifiers.
    pub fn capability(&self) -> Option<&'static str> {
        self.id.split_once('-').map(|(_, suffix)| suffix)
    }

    pub fn is_legacy_alias(&self) -> bool {
        LEGACY_ALIASES
            .iter()
            .any(|(t, legacy, _)| *t == self.taxonomy && *legacy == self.id)
    }
}

/// Shorthand for [`ProviderIdentifier::resolve`].
pub fn resolve(taxonomy: Taxonomy, id: &str) -> Result<ProviderIdentifier> {
    ProviderIdentifier::resolve(taxonomy, id)
}

/// Access kinds referenced by the built-in deployers.
pub mod access {
    pub const ALIYUN: &str = "aliyun";
    pub const KONG: &str = "kong";
    pub const NETLIFY: &str = "netlify";
    pub const TENCENTCLOUD: &str = "tencentcloud";
}

/// Deployment kinds with a built-in deployer.
pub mod deployment {
    pub const ALIYUN_DDOS: &str = "aliyun-ddos";
    pub const KONG: &str = "kong";
    pub const NETLIFY_SITE: &str = "netlify-site";
    pub const TENCENTCLOUD_CDN: &str = "tencentcloud-cdn";
    pub const TENCENTCLOUD_CSS: &str = "tencentcloud-css";
    pub const TENCENTCLOUD_ECDN: &str = "tencentcloud-ecdn";
    pub const TENCENTCLOUD_SSL_UPDATE: &str = "tencentcloud-sslupdate";
}

pub const ACCESS_PROVIDERS: &[&str] = &[
    "1panel", "acmeca", "acmehttpreq", "akamai", "aliyun", "apisix", "aws", "azure",
    "baiducloud", "baishan", "baotapanel", "baotawaf", "bunny", "buypass", "byteplus",
    "cachefly", "cdnfly", "cloudflare", "cloudns", "cmcccloud", "constellix", "ctcccloud",
    "cucccloud", "desec", "digitalocean", "dingtalkbot", "discordbot", "dnsla", "dogecloud",
    "duckdns", "dynv6", "edgio", "email", "fastly", "flexcdn", "gcore", "gname", "godaddy",
    "goedge", "googletrustservices", "hetzner", "huaweicloud", "jdcloud", "k8s", "kong",
    "larkbot", "lecdn", "letsencrypt", "letsencryptstaging", "local", "mattermost",
    "namecheap", "namedotcom", "namesilo", "netcup", "netlify", "ns1", "porkbun", "powerdns",
    "proxmoxve", "qingcloud", "qiniu", "rainyun", "ratpanel", "safeline", "slackbot",
    "spaceship", "ssh", "sslcom", "telegrambot", "tencentcloud", "ucloud", "unicloud", "upyun",
    "vercel", "volcengine", "wangsu", "webhook", "wecombot", "westcn", "zerossl",
];

pub const CA_PROVIDERS: &[&str] = &[
    "acmeca", "buypass", "googletrustservices", "letsencrypt", "letsencryptstaging", "sslcom",
    "zerossl",
];

pub const ACME_DNS01_PROVIDERS: &[&str] = &[
    "acmehttpreq", "aliyun", "aliyun-dns", "aliyun-esa", "aws", "aws-route53", "azure",
    "azure-dns", "baiducloud", "baiducloud-dns", "bunny", "cloudflare", "cloudns", "cmcccloud",
    "cmcccloud-dns", "constellix", "ctcccloud", "ctcccloud-smartdns", "desec", "digitalocean",
    "dnsla", "duckdns", "dynv6", "gcore", "gname", "godaddy", "hetzner", "huaweicloud",
    "huaweicloud-dns", "jdcloud", "jdcloud-dns", "namecheap", "namedotcom", "namesilo",
    "netcup", "netlify", "ns1", "porkbun", "powerdns", "rainyun", "spaceship", "tencentcloud",
    "tencentcloud-dns", "tencentcloud-eo", "ucloud-udnr", "vercel", "volcengine",
    "volcengine-dns", "westcn",
];

pub const DEPLOYMENT_PROVIDERS: &[&str] = &[
    "1panel-console", "1panel-site", "aliyun-alb", "aliyun-apigw", "aliyun-cas",
    "aliyun-casdeploy", "aliyun-cdn", "aliyun-clb", "aliyun-dcdn", "aliyun-ddos", "aliyun-esa",
    "aliyun-fc", "aliyun-ga", "aliyun-live", "aliyun-nlb", "aliyun-oss", "aliyun-vod",
    "aliyun-waf", "apisix", "aws-acm", "aws-cloudfront", "aws-iam", "azure-keyvault",
    "baiducloud-appblb", "baiducloud-blb", "baiducloud-cdn", "baiducloud-cert", "baishan-cdn",
    "baotapanel-console", "baotapanel-site", "baotawaf-console", "baotawaf-site", "bunny-cdn",
    "byteplus-cdn", "cachefly", "cdnfly", "ctcccloud-ao", "ctcccloud-cdn", "ctcccloud-cms",
    "ctcccloud-elb", "ctcccloud-icdn", "ctcccloud-ldvn", "dogecloud-cdn", "edgio-applications",
    "flexcdn", "gcore-cdn", "goedge", "huaweicloud-cdn", "huaweicloud-elb", "huaweicloud-scm",
    "huaweicloud-waf", "jdcloud-alb", "jdcloud-cdn", "jdcloud-live", "jdcloud-vod",
    "k8s-secret", "kong", "lecdn", "local", "netlify-site", "proxmoxve", "qiniu-cdn",
    "qiniu-kodo", "qiniu-pili", "rainyun-rcdn", "ratpanel-console", "ratpanel-site",
    "safeline", "ssh", "tencentcloud-cdn", "tencentcloud-clb", "tencentcloud-cos",
    "tencentcloud-css", "tencentcloud-ecdn", "tencentcloud-eo", "tencentcloud-gaap",
    "tencentcloud-scf", "tencentcloud-ssl", "tencentcloud-ssldeploy", "tencentcloud-sslupdate",
    "tencentcloud-vod", "tencentcloud-waf", "ucloud-ucdn", "ucloud-us3", "unicloud-webhost",
    "upyun-cdn", "upyun-file", "volcengine-alb", "volcengine-cdn", "volcengine-certcenter",
    "volcengine-clb", "volcengine-dcdn", "volcengine-imagex", "volcengine-live",
    "volcengine-tos", "wangsu-cdn", "wangsu-cdnpro", "wangsu-certificate", "webhook",
];

pub const NOTIFICATION_PROVIDERS: &[&str] = &[
    "dingtalkbot", "discordbot", "email", "larkbot", "mattermost", "slackbot", "telegrambot",
    "webhook", "wecombot",
];

/// Bare identifiers kept for old workflow configurations, with the entry they
/// stand for.
pub const LEGACY_ALIASES: &[(Taxonomy, &str, &str)] = &[
    (Taxonomy::AcmeDns01, "aliyun", "aliyun-dns"),
    (Taxonomy::AcmeDns01, "aws", "aws-route53"),
    (Taxonomy::AcmeDns01, "azure", "azure-dns"),
    (Taxonomy::AcmeDns01, "baiducloud", "baiducloud-dns"),
    (Taxonomy::AcmeDns01, "cmcccloud", "cmcccloud-dns"),
    (Taxonomy::AcmeDns01, "ctcccloud", "ctcccloud-smartdns"),
    (Taxonomy::AcmeDns01, "huaweicloud", "huaweicloud-dns"),
    (Taxonomy::AcmeDns01, "jdcloud", "jdcloud-dns"),
    (Taxonomy::AcmeDns01, "tencentcloud", "tencentcloud-dns"),
    (Taxonomy::AcmeDns01, "volcengine", "volcengine-dns"),
];
