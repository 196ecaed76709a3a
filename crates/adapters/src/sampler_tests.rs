// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

struct ProcFixture {
    dir: tempfile::TempDir,
}

impl ProcFixture {
    fn new() -> Self {
        let fixture = ProcFixture {
            dir: tempfile::tempdir().unwrap(),
        };
        fixture.write_meminfo(1_000_000); // 1 GB
        fixture
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn write_meminfo(&self, total_kb: u64) {
        std::fs::write(
            self.root().join("meminfo"),
            format!("MemTotal:       {} kB\nMemFree:        1234 kB\n", total_kb),
        )
        .unwrap();
    }

    fn write_stat(&self, total_jiffies: u64) {
        // Split across user/system/idle; only the sum matters
        std::fs::write(
            self.root().join("stat"),
            format!(
                "cpu  {} 0 0 0 0 0 0 0 0 0\ncpu0 {} 0 0 0 0 0 0 0 0 0\n",
                total_jiffies, total_jiffies
            ),
        )
        .unwrap();
    }

    fn write_pid(&self, pid: i32, utime: u64, stime: u64, rss_kb: u64) {
        let pid_dir = self.root().join(pid.to_string());
        std::fs::create_dir_all(&pid_dir).unwrap();
        std::fs::write(
            pid_dir.join("stat"),
            format!(
                "{pid} (some app) S 1 {pid} {pid} 0 -1 4194304 100 0 0 0 {utime} {stime} 0 0 20 0 1 0 100 1000000 100 18446744073709551615"
            ),
        )
        .unwrap();
        std::fs::write(
            pid_dir.join("status"),
            format!("Name:\tsome app\nVmSize:\t  {} kB\nVmRSS:\t  {} kB\n", rss_kb * 2, rss_kb),
        )
        .unwrap();
    }
}

#[test]
fn first_sample_reports_zero_cpu() {
    let fx = ProcFixture::new();
    fx.write_stat(10_000);
    fx.write_pid(42, 100, 50, 0);

    let mut sampler = ProcSampler::with_proc_root(fx.root());
    let (cpu, _mem) = sampler.sample("app", 42).unwrap();
    assert_eq!(cpu, 0);
}

#[test]
fn cpu_is_jiffy_delta_ratio() {
    let fx = ProcFixture::new();
    fx.write_stat(10_000);
    fx.write_pid(42, 100, 0, 0);

    let mut sampler = ProcSampler::with_proc_root(fx.root());
    sampler.sample("app", 42).unwrap();

    // Process consumed half the machine's jiffies since the last sample
    fx.write_stat(10_100);
    fx.write_pid(42, 150, 0, 0);
    let (cpu, _mem) = sampler.sample("app", 42).unwrap();

    let cores = std::thread::available_parallelism().map(|n| n.get() as u64).unwrap_or(1);
    assert_eq!(cpu as u64, (50 * cores).min(100));
}

#[test]
fn mem_is_rss_fraction_of_total() {
    let fx = ProcFixture::new();
    fx.write_stat(10_000);
    // 250 MB RSS of 1 GB total = 25%
    fx.write_pid(42, 0, 0, 250_000);

    let mut sampler = ProcSampler::with_proc_root(fx.root());
    let (_cpu, mem) = sampler.sample("app", 42).unwrap();
    assert_eq!(mem, 25);
}

#[test]
fn vanished_pid_is_a_read_error() {
    let fx = ProcFixture::new();
    fx.write_stat(10_000);

    let mut sampler = ProcSampler::with_proc_root(fx.root());
    assert!(sampler.sample("app", 99).is_err());
}

#[test]
fn forget_resets_the_delta_baseline() {
    let fx = ProcFixture::new();
    fx.write_stat(10_000);
    fx.write_pid(42, 100, 0, 0);

    let mut sampler = ProcSampler::with_proc_root(fx.root());
    sampler.sample("app", 42).unwrap();
    sampler.forget(42);

    fx.write_stat(10_100);
    fx.write_pid(42, 200, 0, 0);
    // No baseline after forget, so CPU reads 0 again
    let (cpu, _mem) = sampler.sample("app", 42).unwrap();
    assert_eq!(cpu, 0);
}

#[test]
fn fake_sampler_returns_scripted_values() {
    let fake = FakeSampler::new();
    fake.set("hot", 95, 10);

    let mut sampler = fake.clone();
    assert_eq!(sampler.sample("hot", 1234).unwrap(), (95, 10));
    assert_eq!(sampler.sample("other", 1234).unwrap(), (0, 0));

    fake.clear("hot");
    assert_eq!(sampler.sample("hot", 1234).unwrap(), (0, 0));
}
