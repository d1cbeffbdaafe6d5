//! `corsika-dump` binary entry point.
//!
//! Thin wrapper around the corsika-shower library that parses the command
//! line, initializes logging, opens the file and prints the requested view.

use anyhow::{Context, Result, bail};
use corsika_shower::{DumpCommand, DumpConfig, Shower, ShowerFile};

fn main() -> Result<()> {
    // Logs go to stderr so the dump itself can be piped
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = DumpConfig::from_args();
    tracing::debug!(
        "Configuration loaded: file={:?}, level={}, command={:?}",
        config.file,
        config.observation_level,
        config.command
    );

    let mut file = ShowerFile::open(&config.file, config.options())
        .with_context(|| format!("failed to open {}", config.file.display()))?;

    match config.command {
        DumpCommand::Info => print_info(&mut file)?,
        DumpCommand::Events => print_events(&mut file)?,
        DumpCommand::Particles { event, limit } => {
            let shower = select(&mut file, event)?;
            print_particles(&mut file, &shower, limit)?;
        }
        DumpCommand::Profile { event } => {
            let shower = select(&mut file, event)?;
            print_profile(&shower);
        }
    }

    file.close();
    Ok(())
}

fn select(file: &mut ShowerFile, event: Option<u32>) -> Result<Shower> {
    match event {
        Some(id) => Ok(file.find_event(id)?),
        None => match file.read()? {
            Some(shower) => Ok(shower),
            None => bail!("file contains no events"),
        },
    }
}

fn print_info(file: &mut ShowerFile) -> Result<()> {
    println!("layout:      {}", file.variant());
    println!("thinned:     {}", file.is_thinned());
    println!("seekable:    {}", file.is_seekable());
    println!("valid:       {}", file.validate());
    match file.long_file_path() {
        Some(path) => println!("long file:   {}", path.display()),
        None => println!("long file:   none"),
    }
    println!("events:      {}", file.event_count()?);
    Ok(())
}

fn print_events(file: &mut ShowerFile) -> Result<()> {
    println!(
        "{:>8} {:>8} {:>12} {:>9} {:>9} {:>12} {:>6}",
        "event", "primary", "energy/GeV", "zenith", "azimuth", "dt/ns", "steps"
    );
    while let Some(shower) = file.read()? {
        println!(
            "{:>8} {:>8} {:>12.4e} {:>9.3} {:>9.3} {:>12.3} {:>6}",
            shower.event_id(),
            shower.primary(),
            shower.energy(),
            shower.zenith().to_degrees(),
            shower.azimuth().to_degrees(),
            shower.time_shift,
            shower.profile.len(),
        );
    }
    Ok(())
}

fn print_particles(file: &mut ShowerFile, shower: &Shower, limit: Option<usize>) -> Result<()> {
    println!(
        "# event {} at observation level {}",
        shower.event_id(),
        shower.observation_level
    );
    println!(
        "{:>6} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>10}",
        "id", "px", "py", "pz", "x/cm", "y/cm", "t/ns", "weight"
    );
    let particles = file.particles(shower)?;
    for particle in particles.take(limit.unwrap_or(usize::MAX)) {
        let p = particle?;
        println!(
            "{:>6} {:>12.4e} {:>12.4e} {:>12.4e} {:>12.2} {:>12.2} {:>12.3} {:>10.3}",
            p.particle_id(),
            p.px,
            p.py,
            p.pz,
            p.x,
            p.y,
            p.t,
            p.weight
        );
    }
    Ok(())
}

fn print_profile(shower: &Shower) {
    let profile = &shower.profile;
    println!("# event {}: {} steps", shower.event_id(), profile.len());
    if let Some(fit) = &profile.gaisser_hillas {
        println!(
            "# Gaisser-Hillas: Nmax={:.4e} Xmax={:.1} chi2/dof={:.3}",
            fit.n_max(),
            fit.x_max(),
            fit.chi2_per_dof
        );
    }
    if let Some(energy) = profile.calorimetric_energy {
        println!("# calorimetric energy: {energy:.4e} GeV");
    }
    println!(
        "{:>10} {:>12} {:>12} {:>12} {:>12}",
        "depth", "charged", "gammas", "electrons", "muons"
    );
    for i in 0..profile.len() {
        println!(
            "{:>10.1} {:>12.4e} {:>12.4e} {:>12.4e} {:>12.4e}",
            profile.depth[i],
            profile.charged[i],
            profile.gammas[i],
            profile.electrons[i],
            profile.muons[i],
        );
    }
    if profile.has_energy_deposit() {
        println!("{:>10} {:>12}", "depth", "dE/dX");
        for (depth, deposit) in profile
            .energy_deposit_depth
            .iter()
            .zip(&profile.energy_deposit)
        {
            println!("{depth:>10.1} {deposit:>12.4e}");
        }
    }
}
