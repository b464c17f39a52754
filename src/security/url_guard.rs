use crate::types::FlowError;
use async_trait::async_trait;
use reqwest::Url;
use std::fmt::Debug;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use tracing::{debug, warn};

/// 主机名字面量前缀黑名单(绕过 DNS 直接写 IP 的情况)
const BLOCKED_HOST_PREFIXES: &[&str] = &[
    "127.", "10.", "0.", "169.254.", "192.168.", "172.16.", "172.17.", "172.18.", "172.19.",
    "172.20.", "172.21.", "172.22.", "172.23.", "172.24.", "172.25.", "172.26.", "172.27.",
    "172.28.", "172.29.", "172.30.", "172.31.", "224.", "225.", "226.", "227.", "228.", "229.",
    "230.", "231.", "232.", "233.", "234.", "235.", "236.", "237.", "238.", "239.",
];

/// 主机名解析器
#[async_trait]
pub trait HostResolver: Send + Sync + Debug {
    /// 返回主机的 A / AAAA 记录
    async fn resolve(&self, host: &str) -> std::io::Result<Vec<IpAddr>>;
}

/// 基于 tokio 的系统 DNS 解析
#[derive(Debug, Default)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, host: &str) -> std::io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Webhook 目标校验: 字面量 IP 拦截 + 域名白名单 + DNS 解析结果拦截
#[derive(Debug, Clone)]
pub struct UrlGuard {
    allowed_domains: Vec<String>,
    resolver: Arc<dyn HostResolver>,
}

impl UrlGuard {
    pub fn new(allowed_domains: Vec<String>, resolver: Arc<dyn HostResolver>) -> Self {
        Self {
            allowed_domains: allowed_domains
                .into_iter()
                .map(|d| d.trim().trim_end_matches('.').to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
            resolver,
        }
    }

    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }

    /// 白名单匹配
    ///
    /// `example.com` 只匹配自身; `*.example.com` 只匹配一级子域名
    pub fn is_domain_allowed(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_lowercase();
        self.allowed_domains.iter().any(|entry| match entry.strip_prefix("*.") {
            Some(parent) => host
                .strip_suffix(parent)
                .and_then(|rest| rest.strip_suffix('.'))
                .map(|label| !label.is_empty() && !label.contains('.'))
                .unwrap_or(false),
            None => host == *entry,
        })
    }

    /// 校验 URL,全部通过后返回解析好的 URL
    pub async fn check(&self, raw_url: &str) -> Result<Url, FlowError> {
        let url = Url::parse(raw_url.trim())
            .map_err(|e| FlowError::ConfigError(format!("无效的URL {}: {}", raw_url, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(FlowError::ConfigError(format!(
                "不支持的协议: {}",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_lowercase())
            .ok_or_else(|| FlowError::ConfigError(format!("URL 缺少主机名: {}", raw_url)))?;

        // 字面量检查独立于白名单
        if is_blocked_host_literal(&host) {
            return Err(FlowError::BlockedAddress {
                addr: host.clone(),
                host,
            });
        }

        if !self.is_domain_allowed(&host) {
            return Err(FlowError::DomainNotAllowed(host));
        }

        // DNS 失败不拦截,解析到内网地址则拦截
        match self.resolver.resolve(&host).await {
            Ok(addrs) => {
                if let Some(addr) = addrs.iter().find(|ip| is_blocked_ip(ip)) {
                    return Err(FlowError::BlockedAddress {
                        host,
                        addr: addr.to_string(),
                    });
                }
                debug!("{} 解析结果: {:?}", host, addrs);
            }
            Err(e) => {
                warn!("DNS 解析失败 {}: {}, 继续请求白名单域名", host, e);
            }
        }

        Ok(url)
    }
}

/// 主机名字面量是否命中黑名单
pub fn is_blocked_host_literal(host: &str) -> bool {
    let host = host
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim_end_matches('.')
        .to_lowercase();

    if let Ok(ip) = host.parse::<IpAddr>() {
        return is_blocked_ip(&ip);
    }
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }
    BLOCKED_HOST_PREFIXES.iter().any(|prefix| host.starts_with(prefix))
}

/// 回环、私有、链路本地、组播及未指定地址
pub fn is_blocked_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_blocked_ipv4(v4),
        IpAddr::V6(v6) => is_blocked_ipv6(v6),
    }
}

fn is_blocked_ipv4(ip: &Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    matches!(
        (a, b),
        (0, _) | (10, _) | (127, _) | (169, 254) | (192, 168) | (172, 16..=31) | (224..=239, _)
    )
}

fn is_blocked_ipv6(ip: &Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_blocked_ipv4(&v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xffc0) == 0xfe80
        || (first & 0xfe00) == 0xfc00
        || (first & 0xff00) == 0xff00
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    struct StaticResolver {
        records: HashMap<String, Vec<IpAddr>>,
    }

    impl StaticResolver {
        fn with(mut self, host: &str, ips: &[&str]) -> Self {
            self.records.insert(
                host.to_string(),
                ips.iter().map(|ip| ip.parse().unwrap()).collect(),
            );
            self
        }
    }

    #[async_trait]
    impl HostResolver for StaticResolver {
        async fn resolve(&self, host: &str) -> std::io::Result<Vec<IpAddr>> {
            self.records.get(host).cloned().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such host")
            })
        }
    }

    fn guard(domains: &[&str], resolver: StaticResolver) -> UrlGuard {
        UrlGuard::new(
            domains.iter().map(|d| d.to_string()).collect(),
            Arc::new(resolver),
        )
    }

    #[test]
    fn blocked_ip_ranges() {
        for ip in [
            "127.0.0.1", "10.1.2.3", "172.16.0.1", "172.31.255.255", "192.168.1.1",
            "169.254.169.254", "224.0.0.1", "239.1.1.1", "0.0.0.0", "::1", "fe80::1",
            "fd00::1", "fc00::1", "::ffff:127.0.0.1",
        ] {
            assert!(is_blocked_ip(&ip.parse().unwrap()), "{} 应被拦截", ip);
        }
        for ip in ["8.8.8.8", "172.15.0.1", "172.32.0.1", "93.184.216.34", "2606:4700::1111"] {
            assert!(!is_blocked_ip(&ip.parse().unwrap()), "{} 不应被拦截", ip);
        }
    }

    #[test]
    fn literal_host_checks() {
        assert!(is_blocked_host_literal("127.0.0.1"));
        assert!(is_blocked_host_literal("[::1]"));
        assert!(is_blocked_host_literal("localhost"));
        assert!(is_blocked_host_literal("10.0.0.5.nip.io"));
        assert!(!is_blocked_host_literal("webhook.site"));
        assert!(!is_blocked_host_literal("fdroid.org"));
    }

    #[test]
    fn allow_list_matching() {
        let g = guard(&["webhook.site", "sub.webhook.site", "*.example.com"], StaticResolver::default());
        assert!(g.is_domain_allowed("webhook.site"));
        assert!(g.is_domain_allowed("sub.webhook.site"));
        assert!(!g.is_domain_allowed("evil.webhook.site"));
        assert!(g.is_domain_allowed("a.example.com"));
        assert!(!g.is_domain_allowed("a.b.example.com"));
        assert!(!g.is_domain_allowed("example.com"));
        assert!(!g.is_domain_allowed("webhook.site.evil.com"));
        assert!(!g.is_domain_allowed("notwebhook.site"));
    }

    #[tokio::test]
    async fn literal_ip_rejected_even_when_allow_listed() {
        let g = guard(&["127.0.0.1"], StaticResolver::default());
        let err = g.check("http://127.0.0.1:9999/x").await.unwrap_err();
        assert!(matches!(err, FlowError::BlockedAddress { .. }));
    }

    #[tokio::test]
    async fn subdomain_rules() {
        let resolver = StaticResolver::default()
            .with("sub.webhook.site", &["46.4.105.116"])
            .with("evil.webhook.site", &["46.4.105.116"]);
        let g = guard(&["webhook.site", "sub.webhook.site"], resolver);

        assert!(g.check("https://sub.webhook.site/x").await.is_ok());
        let err = g.check("https://evil.webhook.site/x").await.unwrap_err();
        assert!(matches!(err, FlowError::DomainNotAllowed(_)));
    }

    #[tokio::test]
    async fn resolved_private_address_rejected() {
        let resolver = StaticResolver::default().with("hooks.example.com", &["93.184.216.34", "10.0.0.8"]);
        let g = guard(&["hooks.example.com"], resolver);
        let err = g.check("https://hooks.example.com/a").await.unwrap_err();
        assert!(err.is_security_rejection());
    }

    #[tokio::test]
    async fn dns_failure_fails_open() {
        let g = guard(&["hooks.example.com"], StaticResolver::default());
        let url = g.check("https://hooks.example.com/a").await.unwrap();
        assert_eq!(url.host_str(), Some("hooks.example.com"));
    }

    #[tokio::test]
    async fn non_http_scheme_rejected() {
        let g = guard(&["hooks.example.com"], StaticResolver::default());
        assert!(g.check("file:///etc/passwd").await.is_err());
        assert!(g.check("not a url").await.is_err());
    }
}
